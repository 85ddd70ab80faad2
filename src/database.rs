// src/database.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::parser::EmploymentType;

/// Pipeline stage of one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Applied,
    #[serde(rename = "Take-Home Assessment")]
    TakeHomeAssessment,
    #[serde(rename = "Objective Assessment")]
    ObjectiveAssessment,
    #[serde(rename = "Technical Interview")]
    TechnicalInterview,
    #[serde(rename = "Behavioral Interview")]
    BehavioralInterview,
    #[serde(rename = "Final Interview")]
    FinalInterview,
    Rejected,
    Waitlisted,
    Ghosted,
    Accepted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::TakeHomeAssessment => "Take-Home Assessment",
            Self::ObjectiveAssessment => "Objective Assessment",
            Self::TechnicalInterview => "Technical Interview",
            Self::BehavioralInterview => "Behavioral Interview",
            Self::FinalInterview => "Final Interview",
            Self::Rejected => "Rejected",
            Self::Waitlisted => "Waitlisted",
            Self::Ghosted => "Ghosted",
            Self::Accepted => "Accepted",
        }
    }

    pub const ALL: [Self; 10] = [
        Self::Applied,
        Self::TakeHomeAssessment,
        Self::ObjectiveAssessment,
        Self::TechnicalInterview,
        Self::BehavioralInterview,
        Self::FinalInterview,
        Self::Rejected,
        Self::Waitlisted,
        Self::Ghosted,
        Self::Accepted,
    ];
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown application status: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stored job application. Status and employment type are kept as their
/// wire strings; the enums above validate them at the write boundary.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub id: i64,
    pub user_id: i64,
    pub company: String,
    pub job_title: String,
    pub status: String,
    pub job_link: String,
    pub pay_range: String,
    pub benefits: String,
    pub employment_type: String,
    pub date_applied: DateTime<Utc>,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values for a new record, already merged and validated upstream.
#[derive(Debug, Clone)]
pub struct NewJobApplication {
    pub user_id: i64,
    pub company: String,
    pub job_title: String,
    pub status: ApplicationStatus,
    pub job_link: String,
    pub pay_range: String,
    pub benefits: String,
    pub employment_type: EmploymentType,
    pub date_applied: DateTime<Utc>,
    pub job_description: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct JobApplicationUpdate {
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub job_link: Option<String>,
    pub pay_range: Option<String>,
    pub benefits: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub date_applied: Option<DateTime<Utc>>,
    pub job_description: Option<String>,
}

#[derive(Debug)]
pub struct DatabaseConfig {
    pub database_path: PathBuf,
    pub pool: Option<SqlitePool>,
}

impl DatabaseConfig {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            database_path,
            pool: None,
        }
    }

    /// Initialize the database connection pool
    pub async fn init_pool(&mut self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", self.database_path.display());
        let pool = SqlitePool::connect(&database_url)
            .await
            .context("Failed to connect to SQLite database")?;
        self.pool = Some(pool);

        info!("Database connection pool initialized: {}", database_url);
        Ok(())
    }

    /// Get the database pool
    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Database pool not initialized. Call init_pool() first."))
    }

    /// In-memory database, used by tests and the CLI's dry runs.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory SQLite database")?;
        Ok(Self {
            database_path: PathBuf::from(":memory:"),
            pool: Some(pool),
        })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        let pool = self.pool()?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                company TEXT NOT NULL,
                job_title TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'Applied',
                job_link TEXT NOT NULL DEFAULT '',
                pay_range TEXT NOT NULL DEFAULT '',
                benefits TEXT NOT NULL DEFAULT '',
                employment_type TEXT NOT NULL DEFAULT 'Full-time',
                date_applied TEXT NOT NULL,
                job_description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_users_username
            ON users(username);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_job_applications_owner
            ON job_applications(user_id, date_applied);
            "#,
        )
        .execute(pool)
        .await?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a user by (lowercased) username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by the exact username + first-name pair.
    pub async fn find_by_credentials(&self, username: &str, first_name: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, created_at, updated_at
            FROM users
            WHERE username = ? AND first_name = ?
            "#,
        )
        .bind(username)
        .bind(first_name)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user. The caller is responsible for normalization.
    pub async fn create(&self, username: &str, first_name: &str) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, first_name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(first_name)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        let user = User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
            first_name: first_name.to_string(),
            created_at: now,
            updated_at: now,
        };

        info!("Created user: {}", username);
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, first_name, created_at, updated_at
            FROM users
            ORDER BY username ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    pub async fn delete_by_username(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

const JOB_COLUMNS: &str = "id, user_id, company, job_title, status, job_link, pay_range, \
     benefits, employment_type, date_applied, job_description, created_at, updated_at";

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All applications owned by one user, newest first, with optional
    /// exact-match filters.
    pub async fn list_for_user(
        &self,
        user_id: i64,
        status: Option<&str>,
        employment_type: Option<&str>,
    ) -> Result<Vec<JobApplication>> {
        let mut sql = format!("SELECT {JOB_COLUMNS} FROM job_applications WHERE user_id = ?");
        if status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if employment_type.is_some() {
            sql.push_str(" AND employment_type = ?");
        }
        sql.push_str(" ORDER BY date_applied DESC, id DESC");

        let mut query = sqlx::query_as::<_, JobApplication>(&sql).bind(user_id);
        if let Some(status) = status {
            query = query.bind(status);
        }
        if let Some(employment_type) = employment_type {
            query = query.bind(employment_type);
        }

        Ok(query.fetch_all(self.pool).await?)
    }

    pub async fn find_for_user(&self, id: i64, user_id: i64) -> Result<Option<JobApplication>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM job_applications WHERE id = ? AND user_id = ?");
        let job = sqlx::query_as::<_, JobApplication>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(job)
    }

    pub async fn insert(&self, new: &NewJobApplication) -> Result<JobApplication> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO job_applications
                (user_id, company, job_title, status, job_link, pay_range, benefits,
                 employment_type, date_applied, job_description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(&new.company)
        .bind(&new.job_title)
        .bind(new.status.as_str())
        .bind(&new.job_link)
        .bind(&new.pay_range)
        .bind(&new.benefits)
        .bind(new.employment_type.as_str())
        .bind(new.date_applied)
        .bind(&new.job_description)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        info!(
            "Stored application for user {}: {} at {}",
            new.user_id, new.job_title, new.company
        );

        Ok(JobApplication {
            id: result.last_insert_rowid(),
            user_id: new.user_id,
            company: new.company.clone(),
            job_title: new.job_title.clone(),
            status: new.status.as_str().to_string(),
            job_link: new.job_link.clone(),
            pay_range: new.pay_range.clone(),
            benefits: new.benefits.clone(),
            employment_type: new.employment_type.as_str().to_string(),
            date_applied: new.date_applied,
            job_description: new.job_description.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update to an owned record. Returns the refreshed row,
    /// or `None` when the record does not exist for this user.
    pub async fn update_for_user(
        &self,
        id: i64,
        user_id: i64,
        update: &JobApplicationUpdate,
    ) -> Result<Option<JobApplication>> {
        let Some(existing) = self.find_for_user(id, user_id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE job_applications
            SET company = ?, job_title = ?, status = ?, job_link = ?, pay_range = ?,
                benefits = ?, employment_type = ?, date_applied = ?, job_description = ?,
                updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(update.company.as_deref().unwrap_or(&existing.company))
        .bind(update.job_title.as_deref().unwrap_or(&existing.job_title))
        .bind(
            update
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| existing.status.clone()),
        )
        .bind(update.job_link.as_deref().unwrap_or(&existing.job_link))
        .bind(update.pay_range.as_deref().unwrap_or(&existing.pay_range))
        .bind(update.benefits.as_deref().unwrap_or(&existing.benefits))
        .bind(
            update
                .employment_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|| existing.employment_type.clone()),
        )
        .bind(update.date_applied.unwrap_or(existing.date_applied))
        .bind(
            update
                .job_description
                .as_deref()
                .unwrap_or(&existing.job_description),
        )
        .bind(now)
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        self.find_for_user(id, user_id).await
    }

    pub async fn delete_for_user(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM job_applications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> DatabaseConfig {
        let db = DatabaseConfig::in_memory().await.expect("in-memory pool");
        db.migrate().await.expect("migrations should run");
        db
    }

    #[test]
    fn test_status_round_trip() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
        }
        assert!("Hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            ApplicationStatus::TakeHomeAssessment.as_str(),
            "Take-Home Assessment"
        );
        let json = serde_json::to_string(&ApplicationStatus::TechnicalInterview)
            .expect("status should serialize");
        assert_eq!(json, r#""Technical Interview""#);
    }

    #[tokio::test]
    async fn test_user_create_and_lookup() {
        let db = test_db().await;
        let pool = db.pool().expect("pool");
        let repo = UserRepository::new(pool);

        let user = repo.create("jdoe", "John").await.expect("create user");
        assert_eq!(user.username, "jdoe");

        let found = repo
            .find_by_credentials("jdoe", "John")
            .await
            .expect("lookup");
        assert_eq!(found.map(|u| u.id), Some(user.id));

        let wrong = repo
            .find_by_credentials("jdoe", "Jane")
            .await
            .expect("lookup");
        assert!(wrong.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected_by_schema() {
        let db = test_db().await;
        let pool = db.pool().expect("pool");
        let repo = UserRepository::new(pool);

        repo.create("jdoe", "John").await.expect("create user");
        assert!(repo.create("jdoe", "Johnny").await.is_err());
    }

    #[tokio::test]
    async fn test_job_crud_is_owner_scoped() {
        let db = test_db().await;
        let pool = db.pool().expect("pool");
        let users = UserRepository::new(pool);
        let jobs = JobRepository::new(pool);

        let owner = users.create("owner", "Olivia").await.expect("user");
        let other = users.create("other", "Oscar").await.expect("user");

        let new = NewJobApplication {
            user_id: owner.id,
            company: "Acme Corp".to_string(),
            job_title: "Backend Engineer".to_string(),
            status: ApplicationStatus::Applied,
            job_link: String::new(),
            pay_range: "$100000 - $140000".to_string(),
            benefits: String::new(),
            employment_type: EmploymentType::FullTime,
            date_applied: Utc::now(),
            job_description: String::new(),
        };
        let stored = jobs.insert(&new).await.expect("insert");

        assert!(jobs
            .find_for_user(stored.id, other.id)
            .await
            .expect("lookup")
            .is_none());
        assert!(jobs
            .find_for_user(stored.id, owner.id)
            .await
            .expect("lookup")
            .is_some());

        let update = JobApplicationUpdate {
            status: Some(ApplicationStatus::TechnicalInterview),
            ..JobApplicationUpdate::default()
        };
        let updated = jobs
            .update_for_user(stored.id, owner.id, &update)
            .await
            .expect("update")
            .expect("record exists");
        assert_eq!(updated.status, "Technical Interview");
        assert_eq!(updated.company, "Acme Corp");

        assert!(!jobs.delete_for_user(stored.id, other.id).await.expect("delete"));
        assert!(jobs.delete_for_user(stored.id, owner.id).await.expect("delete"));
        assert!(jobs
            .list_for_user(owner.id, None, None)
            .await
            .expect("list")
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_and_order() {
        let db = test_db().await;
        let pool = db.pool().expect("pool");
        let users = UserRepository::new(pool);
        let jobs = JobRepository::new(pool);

        let owner = users.create("owner", "Olivia").await.expect("user");
        let base = NewJobApplication {
            user_id: owner.id,
            company: "Acme".to_string(),
            job_title: "Engineer".to_string(),
            status: ApplicationStatus::Applied,
            job_link: String::new(),
            pay_range: String::new(),
            benefits: String::new(),
            employment_type: EmploymentType::FullTime,
            date_applied: Utc::now() - chrono::Duration::days(2),
            job_description: String::new(),
        };
        jobs.insert(&base).await.expect("insert");
        jobs.insert(&NewJobApplication {
            company: "Initech".to_string(),
            status: ApplicationStatus::Rejected,
            employment_type: EmploymentType::Contract,
            date_applied: Utc::now(),
            ..base.clone()
        })
        .await
        .expect("insert");

        let all = jobs
            .list_for_user(owner.id, None, None)
            .await
            .expect("list");
        assert_eq!(all.len(), 2);
        // Newest first.
        assert_eq!(all[0].company, "Initech");

        let rejected = jobs
            .list_for_user(owner.id, Some("Rejected"), None)
            .await
            .expect("list");
        assert_eq!(rejected.len(), 1);

        let contract = jobs
            .list_for_user(owner.id, None, Some("Contract"))
            .await
            .expect("list");
        assert_eq!(contract.len(), 1);
        assert_eq!(contract[0].company, "Initech");
    }
}
