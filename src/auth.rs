// src/auth.rs
use crate::database::{DatabaseConfig, User, UserRepository};
use crate::utils::{normalize_username, validate_signup};
use anyhow::Result;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use sqlx::SqlitePool;
use tracing::{error, warn};

pub const USERNAME_COOKIE: &str = "username";
pub const FIRST_NAME_COOKIE: &str = "first_name";

const SESSION_MAX_AGE_DAYS: i64 = 7;

/// The authenticated user behind the session cookie pair.
pub struct SessionUser {
    pub user: User,
}

impl SessionUser {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingSession,
    InvalidSession,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingSession => "Authentication required",
            AuthError::InvalidSession => "Session is no longer valid",
            AuthError::DatabaseError => "Database error occurred",
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let db_config = match req.guard::<&State<DatabaseConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => {
                return Outcome::Error((status, AuthError::DatabaseError))
            }
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let cookies = req.cookies();
        let username = cookies
            .get_private(USERNAME_COOKIE)
            .map(|c| c.value().to_string());
        let first_name = cookies
            .get_private(FIRST_NAME_COOKIE)
            .map(|c| c.value().to_string());

        let (Some(username), Some(first_name)) = (username, first_name) else {
            return Outcome::Error((Status::Unauthorized, AuthError::MissingSession));
        };

        let pool = match db_config.pool() {
            Ok(pool) => pool,
            Err(e) => {
                error!("Database connection failed: {}", e);
                return Outcome::Error((Status::InternalServerError, AuthError::DatabaseError));
            }
        };

        let repo = UserRepository::new(pool);
        match repo
            .find_by_credentials(&normalize_username(&username), first_name.trim())
            .await
        {
            Ok(Some(user)) => Outcome::Success(SessionUser { user }),
            Ok(None) => {
                warn!("Session cookies did not match a stored user: {}", username);
                Outcome::Error((Status::Unauthorized, AuthError::InvalidSession))
            }
            Err(e) => {
                error!("User lookup failed for {}: {}", username, e);
                Outcome::Error((Status::InternalServerError, AuthError::DatabaseError))
            }
        }
    }
}

/// Session guard that never fails; used by endpoints open to anonymous users.
pub struct OptionalSession {
    pub user: Option<SessionUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalSession {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match SessionUser::from_request(req).await {
            Outcome::Success(session) => Outcome::Success(OptionalSession {
                user: Some(session),
            }),
            _ => Outcome::Success(OptionalSession { user: None }),
        }
    }
}

/// Look up the exact username + first-name pair. `None` means the pair is
/// unknown; the caller turns that into a 401.
pub async fn authenticate_user(
    pool: &SqlitePool,
    username: &str,
    first_name: &str,
) -> Result<Option<User>> {
    let repo = UserRepository::new(pool);
    repo.find_by_credentials(&normalize_username(username), first_name.trim())
        .await
}

/// Create a user after validating the signup rules. Duplicate usernames are
/// rejected with a caller-visible message.
pub async fn create_user(pool: &SqlitePool, username: &str, first_name: &str) -> Result<User> {
    validate_signup(username, first_name)?;

    let repo = UserRepository::new(pool);
    let normalized = normalize_username(username);
    if repo.find_by_username(&normalized).await?.is_some() {
        anyhow::bail!("Username already exists");
    }

    repo.create(&normalized, first_name.trim()).await
}

/// Install the session cookie pair for a logged-in user.
pub fn set_session_cookies(jar: &CookieJar<'_>, user: &User) {
    let max_age = rocket::time::Duration::days(SESSION_MAX_AGE_DAYS);
    jar.add_private(
        Cookie::build((USERNAME_COOKIE, user.username.clone()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(max_age),
    );
    jar.add_private(
        Cookie::build((FIRST_NAME_COOKIE, user.first_name.clone()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(max_age),
    );
}

/// Drop the session cookie pair.
pub fn clear_session_cookies(jar: &CookieJar<'_>) {
    jar.remove_private(Cookie::from(USERNAME_COOKIE));
    jar.remove_private(Cookie::from(FIRST_NAME_COOKIE));
}
