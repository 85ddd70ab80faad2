// src/user_cli.rs
use crate::auth;
use crate::database::{DatabaseConfig, UserRepository};
use crate::utils::normalize_username;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "user-manager")]
#[command(about = "Manage users for the job tracker")]
pub struct UserCli {
    #[command(subcommand)]
    pub command: UserCommand,

    /// Override the database file used by the server
    #[arg(long)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Add a new user
    Add { username: String, first_name: String },
    /// Delete a user by username
    Remove { username: String },
    /// List all users
    List,
    /// Check a username + first-name login pair
    Check { username: String, first_name: String },
    /// Import users from a CSV file (username,first_name)
    Import { csv_file: PathBuf },
}

pub async fn handle_user_command(cli: UserCli, default_database_path: PathBuf) -> Result<()> {
    let database_path = cli.database_path.unwrap_or(default_database_path);

    let mut db_config = DatabaseConfig::new(database_path);
    db_config.init_pool().await?;
    db_config.migrate().await?;

    let pool = db_config.pool()?;
    let user_repo = UserRepository::new(pool);

    match cli.command {
        UserCommand::Add {
            username,
            first_name,
        } => match auth::create_user(pool, &username, &first_name).await {
            Ok(user) => {
                println!("✓ User created successfully:");
                println!("  Username: {}", user.username);
                println!("  First name: {}", user.first_name);
                println!("  ID: {}", user.id);
            }
            Err(e) => {
                println!("❌ Error: {}", e);
            }
        },

        UserCommand::Remove { username } => {
            let normalized = normalize_username(&username);
            match user_repo.delete_by_username(&normalized).await {
                Ok(true) => println!("✓ User deleted: {}", normalized),
                Ok(false) => println!("❌ No user found for username: {}", normalized),
                Err(e) => println!("❌ Error: {}", e),
            }
        }

        UserCommand::List => match user_repo.list().await {
            Ok(users) => {
                if users.is_empty() {
                    println!("No users found.");
                } else {
                    println!("{:<5} {:<25} {:<20} {:<20}", "ID", "Username", "First name", "Created");
                    println!("{}", "-".repeat(70));
                    for user in users {
                        println!(
                            "{:<5} {:<25} {:<20} {:<20}",
                            user.id,
                            user.username,
                            user.first_name,
                            user.created_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
            }
            Err(e) => println!("❌ Error: {}", e),
        },

        UserCommand::Check {
            username,
            first_name,
        } => match auth::authenticate_user(pool, &username, &first_name).await {
            Ok(Some(user)) => {
                println!("✓ Pair is valid for user id {}", user.id);
            }
            Ok(None) => {
                println!("❌ No user matches that username + first-name pair");
            }
            Err(e) => println!("❌ Error: {}", e),
        },

        UserCommand::Import { csv_file } => {
            if !csv_file.exists() {
                println!("❌ CSV file not found: {}", csv_file.display());
                return Ok(());
            }

            let content = tokio::fs::read_to_string(&csv_file).await?;
            let mut reader = csv::Reader::from_reader(content.as_bytes());

            let mut success_count = 0;
            let mut error_count = 0;

            for result in reader.records() {
                match result {
                    Ok(record) => {
                        let username = record.get(0).unwrap_or("").trim();
                        let first_name = record.get(1).unwrap_or("").trim();

                        if username.is_empty() || first_name.is_empty() {
                            error_count += 1;
                            println!("⚠️  Skipping record without username or first name");
                            continue;
                        }

                        match auth::create_user(pool, username, first_name).await {
                            Ok(user) => {
                                success_count += 1;
                                println!("✓ Added: {} ({})", user.username, user.first_name);
                            }
                            Err(e) => {
                                error_count += 1;
                                if e.to_string().contains("already exists") {
                                    println!("⚠️  Skipped (already exists): {}", username);
                                } else {
                                    println!("❌ Failed to add {}: {}", username, e);
                                }
                            }
                        }
                    }
                    Err(e) => {
                        error_count += 1;
                        println!("❌ CSV parsing error: {}", e);
                    }
                }
            }

            println!("\nImport completed:");
            println!("  ✓ Success: {}", success_count);
            println!("  ❌ Errors:  {}", error_count);
        }
    }

    Ok(())
}
