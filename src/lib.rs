pub mod auth;
pub mod core;
pub mod database;
pub mod parser;
pub mod user_cli;
pub mod utils;
pub mod web;

pub use parser::{DescriptionExtractor, EmploymentType, ExtractorConfig, ParsedJob};
pub use web::start_web_server;
