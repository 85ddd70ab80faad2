// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use crate::auth::{OptionalSession, SessionUser};
use crate::database::{DatabaseConfig, JobApplication};
use crate::parser::DescriptionExtractor;
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{CookieJar, Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, put, routes, Request, Response, State};
use std::path::PathBuf;
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

type ApiError = (Status, Json<ErrorResponse>);

#[post("/auth/signup", data = "<request>")]
pub async fn signup(
    request: Json<CredentialsRequest>,
    cookies: &CookieJar<'_>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<AuthResponse>, ApiError> {
    handlers::signup_handler(request, cookies, db_config).await
}

#[post("/auth/login", data = "<request>")]
pub async fn login(
    request: Json<CredentialsRequest>,
    cookies: &CookieJar<'_>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<AuthResponse>, ApiError> {
    handlers::login_handler(request, cookies, db_config).await
}

#[post("/auth/logout")]
pub async fn logout(cookies: &CookieJar<'_>) -> Json<MessageResponse> {
    handlers::logout_handler(cookies).await
}

#[get("/auth/me")]
pub async fn me(session: SessionUser) -> Json<AuthResponse> {
    handlers::me_handler(session).await
}

#[get("/jobs?<status>&<employment_type>")]
pub async fn list_jobs(
    session: SessionUser,
    status: Option<String>,
    employment_type: Option<String>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<Vec<JobApplication>>>, ApiError> {
    handlers::list_jobs_handler(session, status, employment_type, db_config).await
}

#[post("/jobs", data = "<request>")]
pub async fn create_job(
    session: SessionUser,
    request: Json<CreateJobRequest>,
    extractor: &State<DescriptionExtractor>,
    db_config: &State<DatabaseConfig>,
) -> Result<(Status, Json<DataResponse<JobApplication>>), ApiError> {
    handlers::create_job_handler(session, request, extractor, db_config).await
}

#[get("/jobs/<id>")]
pub async fn get_job(
    id: i64,
    session: SessionUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<JobApplication>>, ApiError> {
    handlers::get_job_handler(id, session, db_config).await
}

#[put("/jobs/<id>", data = "<request>")]
pub async fn update_job(
    id: i64,
    session: SessionUser,
    request: Json<UpdateJobRequest>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<JobApplication>>, ApiError> {
    handlers::update_job_handler(id, session, request, db_config).await
}

#[delete("/jobs/<id>")]
pub async fn delete_job(
    id: i64,
    session: SessionUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<serde_json::Value>>, ApiError> {
    handlers::delete_job_handler(id, session, db_config).await
}

#[post("/jobs/parse", data = "<request>")]
pub async fn parse_description(
    session: SessionUser,
    request: Json<ParseRequest>,
    extractor: &State<DescriptionExtractor>,
) -> Json<DataResponse<crate::parser::ParsedJob>> {
    handlers::parse_description_handler(session, request, extractor).await
}

#[get("/jobs/export")]
pub async fn export_jobs(
    session: SessionUser,
    db_config: &State<DatabaseConfig>,
) -> Result<CsvResponse, ApiError> {
    handlers::export_jobs_handler(session, db_config).await
}

#[get("/health")]
pub async fn health(session: OptionalSession) -> Json<&'static str> {
    if let Some(session) = session.user {
        info!("Health check by authenticated user: {}", session.username());
    } else {
        info!("Health check by anonymous user");
    }
    Json("OK")
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Invalid request format"))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Authentication required"))
}

#[rocket::catch(404)]
pub fn route_not_found() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Not found"))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new("Internal server error"))
}

// Main server start function
pub async fn start_web_server(database_path: PathBuf, port: u16) -> Result<()> {
    let mut db_config = DatabaseConfig::new(database_path);
    db_config.init_pool().await?;
    db_config.migrate().await?;

    let extractor = DescriptionExtractor::with_defaults()
        .map_err(|e| anyhow::anyhow!("Failed to compile extraction patterns: {e}"))?;

    info!("Starting job application tracker API server");
    info!("Database: {}", db_config.database_path.display());
    info!("Server: http://0.0.0.0:{}", port);

    let figment = rocket::Config::figment().merge(("port", port));

    rocket::custom(figment)
        .attach(Cors)
        .manage(db_config)
        .manage(extractor)
        .register(
            "/api",
            catchers![bad_request, unauthorized, route_not_found, internal_error],
        )
        .mount(
            "/api",
            routes![
                signup,
                login,
                logout,
                me,
                list_jobs,
                create_job,
                get_job,
                update_job,
                delete_job,
                parse_description,
                export_jobs,
                health,
                options,
            ],
        )
        .launch()
        .await?;

    Ok(())
}
