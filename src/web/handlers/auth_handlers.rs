// src/web/handlers/auth_handlers.rs
use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use crate::auth::{self, SessionUser};
use crate::database::DatabaseConfig;
use crate::web::types::{AuthResponse, CredentialsRequest, ErrorResponse, MessageResponse};

type ApiError = (Status, Json<ErrorResponse>);

fn database_error(context: &str, e: anyhow::Error) -> ApiError {
    error!("{}: {}", context, e);
    (
        Status::InternalServerError,
        Json(ErrorResponse::new("Database error occurred")),
    )
}

fn require_credentials(request: &CredentialsRequest) -> Result<(), ApiError> {
    if request.username.trim().is_empty() || request.first_name.trim().is_empty() {
        return Err((
            Status::BadRequest,
            Json(ErrorResponse::new("Username and first name are required")),
        ));
    }
    Ok(())
}

pub async fn signup_handler(
    request: Json<CredentialsRequest>,
    cookies: &CookieJar<'_>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<AuthResponse>, ApiError> {
    require_credentials(&request)?;

    let pool = db_config
        .pool()
        .map_err(|e| database_error("Database connection failed", e))?;

    match auth::create_user(pool, &request.username, &request.first_name).await {
        Ok(user) => {
            info!("User signed up: {}", user.username);
            auth::set_session_cookies(cookies, &user);
            Ok(Json(AuthResponse::new(&user)))
        }
        Err(e) => {
            let message = e.to_string();
            // Validation and duplicate failures are the caller's fault.
            if message.contains("must be at least") || message.contains("already exists") {
                Err((Status::BadRequest, Json(ErrorResponse::new(message))))
            } else {
                Err(database_error("Signup failed", e))
            }
        }
    }
}

pub async fn login_handler(
    request: Json<CredentialsRequest>,
    cookies: &CookieJar<'_>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<AuthResponse>, ApiError> {
    require_credentials(&request)?;

    let pool = db_config
        .pool()
        .map_err(|e| database_error("Database connection failed", e))?;

    match auth::authenticate_user(pool, &request.username, &request.first_name).await {
        Ok(Some(user)) => {
            info!("User logged in: {}", user.username);
            auth::set_session_cookies(cookies, &user);
            Ok(Json(AuthResponse::new(&user)))
        }
        Ok(None) => Err((
            Status::Unauthorized,
            Json(ErrorResponse::new("Invalid username or first name")),
        )),
        Err(e) => Err(database_error("Login failed", e)),
    }
}

pub async fn logout_handler(cookies: &CookieJar<'_>) -> Json<MessageResponse> {
    auth::clear_session_cookies(cookies);
    Json(MessageResponse::ok())
}

pub async fn me_handler(session: SessionUser) -> Json<AuthResponse> {
    Json(AuthResponse::new(session.user()))
}
