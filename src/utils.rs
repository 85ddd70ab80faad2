// src/utils.rs
use anyhow::Result;

/// Normalize a username for storage and lookup: trimmed and lowercased.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Truncate to at most `limit` characters on a char boundary.
pub fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Validate signup input against the minimum-length rules.
pub fn validate_signup(username: &str, first_name: &str) -> Result<()> {
    if username.trim().chars().count() < 3 {
        anyhow::bail!("Username must be at least 3 characters");
    }
    if first_name.trim().chars().count() < 2 {
        anyhow::bail!("First name must be at least 2 characters");
    }
    Ok(())
}
