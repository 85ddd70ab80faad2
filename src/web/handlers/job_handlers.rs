// src/web/handlers/job_handlers.rs
use chrono::Utc;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use crate::auth::SessionUser;
use crate::database::{
    ApplicationStatus, DatabaseConfig, JobApplication, JobApplicationUpdate, JobRepository,
    NewJobApplication,
};
use crate::parser::{DescriptionExtractor, EmploymentType, ParsedJob};
use crate::web::types::{
    CreateJobRequest, CsvResponse, DataResponse, ErrorResponse, ParseRequest, UpdateJobRequest,
};

type ApiError = (Status, Json<ErrorResponse>);

fn database_error(context: &str, e: anyhow::Error) -> ApiError {
    error!("{}: {}", context, e);
    (
        Status::InternalServerError,
        Json(ErrorResponse::new("Database error occurred")),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (Status::BadRequest, Json(ErrorResponse::new(message)))
}

fn not_found() -> ApiError {
    (Status::NotFound, Json(ErrorResponse::new("Job not found")))
}

/// Manual field wins over extracted, extracted over the default. Blank manual
/// input falls through rather than erasing an extracted value.
fn merge_text(manual: &Option<String>, extracted: &Option<String>) -> String {
    manual
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| extracted.as_deref().map(str::trim))
        .unwrap_or("")
        .to_string()
}

/// Combine manual fields and extraction output into a storable record.
fn build_new_job(
    user_id: i64,
    request: &CreateJobRequest,
    parsed: &ParsedJob,
) -> Result<NewJobApplication, String> {
    let company = merge_text(&request.company, &parsed.company);
    if company.is_empty() {
        return Err("Company name is required".to_string());
    }
    let job_title = merge_text(&request.job_title, &parsed.job_title);
    if job_title.is_empty() {
        return Err("Job title is required".to_string());
    }

    let status = match request.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<ApplicationStatus>()
            .map_err(|_| format!("Invalid status: {raw}"))?,
        None => ApplicationStatus::Applied,
    };

    let employment_type = match request
        .employment_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(raw) => raw
            .parse::<EmploymentType>()
            .map_err(|_| format!("Invalid employment type: {raw}"))?,
        None => parsed.employment_type.unwrap_or(EmploymentType::FullTime),
    };

    Ok(NewJobApplication {
        user_id,
        company,
        job_title,
        status,
        job_link: merge_text(&request.job_link, &parsed.job_link),
        pay_range: merge_text(&request.pay_range, &parsed.pay_range),
        benefits: merge_text(&request.benefits, &parsed.benefits),
        employment_type,
        date_applied: request.date_applied.unwrap_or_else(Utc::now),
        job_description: request
            .job_description
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string(),
    })
}

/// Turn a partial update request into repository form, validating the fields
/// it actually carries.
fn build_update(request: &UpdateJobRequest) -> Result<JobApplicationUpdate, String> {
    if let Some(company) = &request.company {
        if company.trim().is_empty() {
            return Err("Company name is required".to_string());
        }
    }
    if let Some(job_title) = &request.job_title {
        if job_title.trim().is_empty() {
            return Err("Job title is required".to_string());
        }
    }

    let status = request
        .status
        .as_deref()
        .map(|raw| {
            raw.parse::<ApplicationStatus>()
                .map_err(|_| format!("Invalid status: {raw}"))
        })
        .transpose()?;
    let employment_type = request
        .employment_type
        .as_deref()
        .map(|raw| {
            raw.parse::<EmploymentType>()
                .map_err(|_| format!("Invalid employment type: {raw}"))
        })
        .transpose()?;

    let trimmed = |field: &Option<String>| field.as_deref().map(|s| s.trim().to_string());

    Ok(JobApplicationUpdate {
        company: trimmed(&request.company),
        job_title: trimmed(&request.job_title),
        status,
        job_link: trimmed(&request.job_link),
        pay_range: trimmed(&request.pay_range),
        benefits: trimmed(&request.benefits),
        employment_type,
        date_applied: request.date_applied,
        job_description: trimmed(&request.job_description),
    })
}

fn validate_filters(
    status: &Option<String>,
    employment_type: &Option<String>,
) -> Result<(), ApiError> {
    if let Some(status) = status {
        status
            .parse::<ApplicationStatus>()
            .map_err(|_| bad_request(format!("Invalid status filter: {status}")))?;
    }
    if let Some(employment_type) = employment_type {
        employment_type
            .parse::<EmploymentType>()
            .map_err(|_| bad_request(format!("Invalid employment type filter: {employment_type}")))?;
    }
    Ok(())
}

pub async fn list_jobs_handler(
    session: SessionUser,
    status: Option<String>,
    employment_type: Option<String>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<Vec<JobApplication>>>, ApiError> {
    validate_filters(&status, &employment_type)?;

    let pool = db_config
        .pool()
        .map_err(|e| database_error("Database connection failed", e))?;

    let jobs = JobRepository::new(pool)
        .list_for_user(session.id(), status.as_deref(), employment_type.as_deref())
        .await
        .map_err(|e| database_error("Failed to list applications", e))?;

    Ok(Json(DataResponse::new(jobs)))
}

pub async fn create_job_handler(
    session: SessionUser,
    request: Json<CreateJobRequest>,
    extractor: &State<DescriptionExtractor>,
    db_config: &State<DatabaseConfig>,
) -> Result<(Status, Json<DataResponse<JobApplication>>), ApiError> {
    let parsed = match request.job_description.as_deref() {
        Some(description) => extractor.extract(description),
        None => ParsedJob::default(),
    };

    let new = build_new_job(session.id(), &request, &parsed).map_err(bad_request)?;

    let pool = db_config
        .pool()
        .map_err(|e| database_error("Database connection failed", e))?;

    let job = JobRepository::new(pool)
        .insert(&new)
        .await
        .map_err(|e| database_error("Failed to store application", e))?;

    info!(
        "User {} tracked application {} ({} at {})",
        session.username(),
        job.id,
        job.job_title,
        job.company
    );

    Ok((Status::Created, Json(DataResponse::new(job))))
}

pub async fn get_job_handler(
    id: i64,
    session: SessionUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<JobApplication>>, ApiError> {
    let pool = db_config
        .pool()
        .map_err(|e| database_error("Database connection failed", e))?;

    let job = JobRepository::new(pool)
        .find_for_user(id, session.id())
        .await
        .map_err(|e| database_error("Failed to load application", e))?
        .ok_or_else(not_found)?;

    Ok(Json(DataResponse::new(job)))
}

pub async fn update_job_handler(
    id: i64,
    session: SessionUser,
    request: Json<UpdateJobRequest>,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<JobApplication>>, ApiError> {
    let update = build_update(&request).map_err(bad_request)?;

    let pool = db_config
        .pool()
        .map_err(|e| database_error("Database connection failed", e))?;

    let job = JobRepository::new(pool)
        .update_for_user(id, session.id(), &update)
        .await
        .map_err(|e| database_error("Failed to update application", e))?
        .ok_or_else(not_found)?;

    Ok(Json(DataResponse::new(job)))
}

pub async fn delete_job_handler(
    id: i64,
    session: SessionUser,
    db_config: &State<DatabaseConfig>,
) -> Result<Json<DataResponse<serde_json::Value>>, ApiError> {
    let pool = db_config
        .pool()
        .map_err(|e| database_error("Database connection failed", e))?;

    let deleted = JobRepository::new(pool)
        .delete_for_user(id, session.id())
        .await
        .map_err(|e| database_error("Failed to delete application", e))?;

    if !deleted {
        return Err(not_found());
    }

    info!("User {} deleted application {}", session.username(), id);
    Ok(Json(DataResponse::new(serde_json::json!({}))))
}

/// Extraction preview: run the engine over a description without storing
/// anything. Absent fields stay absent in the JSON.
pub async fn parse_description_handler(
    _session: SessionUser,
    request: Json<ParseRequest>,
    extractor: &State<DescriptionExtractor>,
) -> Json<DataResponse<ParsedJob>> {
    Json(DataResponse::new(extractor.extract(&request.description)))
}

pub async fn export_jobs_handler(
    session: SessionUser,
    db_config: &State<DatabaseConfig>,
) -> Result<CsvResponse, ApiError> {
    let pool = db_config
        .pool()
        .map_err(|e| database_error("Database connection failed", e))?;

    let jobs = JobRepository::new(pool)
        .list_for_user(session.id(), None, None)
        .await
        .map_err(|e| database_error("Failed to list applications", e))?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "Company",
            "Job Title",
            "Status",
            "Employment Type",
            "Pay Range",
            "Benefits",
            "Job Link",
            "Date Applied",
        ])
        .map_err(|e| database_error("Failed to build CSV", e.into()))?;

    for job in &jobs {
        let date_applied = job.date_applied.format("%Y-%m-%d").to_string();
        writer
            .write_record([
                job.company.as_str(),
                job.job_title.as_str(),
                job.status.as_str(),
                job.employment_type.as_str(),
                job.pay_range.as_str(),
                job.benefits.as_str(),
                job.job_link.as_str(),
                date_applied.as_str(),
            ])
            .map_err(|e| database_error("Failed to build CSV", e.into()))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| database_error("Failed to build CSV", anyhow::anyhow!("{e}")))?;

    Ok(CsvResponse {
        data,
        filename: "applications.csv".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> DescriptionExtractor {
        DescriptionExtractor::with_defaults().expect("default tables should compile")
    }

    const DESCRIPTION: &str = "Acme Corp\n\
        Senior Backend Engineer (Remote)\n\
        Full-time position. Salary: $100,000 - $140,000.\n\
        Apply at https://jobs.lever.co/acme/123\n";

    #[test]
    fn test_extracted_fields_fill_the_record() {
        let parsed = extractor().extract(DESCRIPTION);
        let request = CreateJobRequest {
            job_description: Some(DESCRIPTION.to_string()),
            ..CreateJobRequest::default()
        };

        let new = build_new_job(1, &request, &parsed).expect("record should build");
        assert_eq!(new.company, "Acme Corp");
        assert_eq!(new.job_title, "Senior Backend Engineer (Remote)");
        assert_eq!(new.pay_range, "$100000 - $140000");
        assert_eq!(new.employment_type, EmploymentType::FullTime);
        assert_eq!(new.job_link, "https://jobs.lever.co/acme/123");
        assert_eq!(new.status, ApplicationStatus::Applied);
    }

    #[test]
    fn test_manual_fields_win_over_extracted() {
        let parsed = extractor().extract(DESCRIPTION);
        let request = CreateJobRequest {
            job_description: Some(DESCRIPTION.to_string()),
            company: Some("Acme Holdings".to_string()),
            pay_range: Some("$150k".to_string()),
            employment_type: Some("Contract".to_string()),
            ..CreateJobRequest::default()
        };

        let new = build_new_job(1, &request, &parsed).expect("record should build");
        assert_eq!(new.company, "Acme Holdings");
        assert_eq!(new.pay_range, "$150k");
        assert_eq!(new.employment_type, EmploymentType::Contract);
        // Untouched fields still come from extraction.
        assert_eq!(new.job_title, "Senior Backend Engineer (Remote)");
    }

    #[test]
    fn test_defaults_apply_when_nothing_matches() {
        let parsed = ParsedJob::default();
        let request = CreateJobRequest {
            company: Some("Initech".to_string()),
            job_title: Some("Engineer".to_string()),
            ..CreateJobRequest::default()
        };

        let new = build_new_job(1, &request, &parsed).expect("record should build");
        assert_eq!(new.status, ApplicationStatus::Applied);
        assert_eq!(new.employment_type, EmploymentType::FullTime);
        assert_eq!(new.job_link, "");
        assert_eq!(new.benefits, "");
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let parsed = ParsedJob::default();
        let request = CreateJobRequest::default();
        let err = build_new_job(1, &request, &parsed).expect_err("company is required");
        assert_eq!(err, "Company name is required");

        let request = CreateJobRequest {
            company: Some("Initech".to_string()),
            ..CreateJobRequest::default()
        };
        let err = build_new_job(1, &request, &parsed).expect_err("title is required");
        assert_eq!(err, "Job title is required");
    }

    #[test]
    fn test_unknown_status_rejected() {
        let parsed = ParsedJob::default();
        let request = CreateJobRequest {
            company: Some("Initech".to_string()),
            job_title: Some("Engineer".to_string()),
            status: Some("Hired".to_string()),
            ..CreateJobRequest::default()
        };
        let err = build_new_job(1, &request, &parsed).expect_err("unknown status");
        assert!(err.contains("Invalid status"));
    }

    #[test]
    fn test_update_rejects_blanked_required_fields() {
        let request = UpdateJobRequest {
            company: Some("   ".to_string()),
            ..UpdateJobRequest::default()
        };
        assert!(build_update(&request).is_err());

        let request = UpdateJobRequest {
            status: Some("Ghosted".to_string()),
            benefits: Some("  401k match  ".to_string()),
            ..UpdateJobRequest::default()
        };
        let update = build_update(&request).expect("update should build");
        assert_eq!(update.status, Some(ApplicationStatus::Ghosted));
        assert_eq!(update.benefits.as_deref(), Some("401k match"));
        assert!(update.company.is_none());
    }

    #[test]
    fn test_blank_manual_field_falls_through_to_extracted() {
        let parsed = extractor().extract(DESCRIPTION);
        let request = CreateJobRequest {
            job_description: Some(DESCRIPTION.to_string()),
            company: Some("   ".to_string()),
            ..CreateJobRequest::default()
        };

        let new = build_new_job(1, &request, &parsed).expect("record should build");
        assert_eq!(new.company, "Acme Corp");
    }
}
