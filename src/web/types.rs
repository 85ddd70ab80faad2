// src/web/types.rs
use chrono::{DateTime, Utc};
use rocket::http::ContentType;
use rocket::response::{self, Responder};
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};

use crate::database::User;

/// Success envelope: `{"success": true, "data": ...}`.
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Error envelope: `{"success": false, "error": "..."}`.
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub first_name: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserInfo,
}

impl AuthResponse {
    pub fn new(user: &User) -> Self {
        Self {
            success: true,
            user: user.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MessageResponse {
    pub success: bool,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Signup and login share the same credential pair.
#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub username: String,
    pub first_name: String,
}

/// New record: a pasted description plus manual overrides. Manual fields win
/// over whatever the extractor recovers.
#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub job_description: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub status: Option<String>,
    pub job_link: Option<String>,
    pub pay_range: Option<String>,
    pub benefits: Option<String>,
    pub employment_type: Option<String>,
    pub date_applied: Option<DateTime<Utc>>,
}

/// Partial record update; absent fields keep their stored values.
#[derive(Deserialize, Default)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub status: Option<String>,
    pub job_link: Option<String>,
    pub pay_range: Option<String>,
    pub benefits: Option<String>,
    pub employment_type: Option<String>,
    pub date_applied: Option<DateTime<Utc>>,
    pub job_description: Option<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ParseRequest {
    pub description: String,
}

/// CSV download with an attachment filename.
pub struct CsvResponse {
    pub data: Vec<u8>,
    pub filename: String,
}

impl<'r> Responder<'r, 'static> for CsvResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(ContentType::CSV)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .sized_body(self.data.len(), std::io::Cursor::new(self.data))
            .ok()
    }
}
