//! Heuristic extraction of structured fields from pasted job descriptions.
//!
//! The extractor is pure and deterministic: one input string in, a partial
//! field set out. It never fails and never performs I/O, so a single instance
//! can be shared across requests as immutable state. Fields that match
//! nothing are simply absent; callers merge the result under any
//! user-supplied values.

mod fields;
pub mod patterns;

pub use patterns::{ExtractorConfig, PatternError};

use patterns::PatternSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Employment type of a posting, in match-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Internship,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Contract => "Contract",
            Self::Internship => "Internship",
        }
    }

    pub const ALL: [Self; 4] = [
        Self::FullTime,
        Self::PartTime,
        Self::Contract,
        Self::Internship,
    ];
}

impl std::fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmploymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown employment type: {s}"))
    }
}

/// Fields recovered from one description. Every field is optional; an absent
/// field serializes as an absent key, never as null or an empty string.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_link: Option<String>,
}

impl ParsedJob {
    /// True when no field matched at all.
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.job_title.is_none()
            && self.pay_range.is_none()
            && self.employment_type.is_none()
            && self.benefits.is_none()
            && self.job_link.is_none()
    }
}

/// The extraction engine: configuration tables plus their compiled patterns.
#[derive(Debug)]
pub struct DescriptionExtractor {
    pub(crate) config: ExtractorConfig,
    pub(crate) patterns: PatternSet,
}

impl DescriptionExtractor {
    /// Build an extractor from a pattern configuration.
    pub fn new(config: ExtractorConfig) -> Result<Self, PatternError> {
        let patterns = PatternSet::compile(&config)?;
        Ok(Self { config, patterns })
    }

    /// Build an extractor with the default tables.
    pub fn with_defaults() -> Result<Self, PatternError> {
        Self::new(ExtractorConfig::default())
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract whatever fields the description yields. Total over all string
    /// inputs: empty or unmatched text produces an empty result.
    pub fn extract(&self, description: &str) -> ParsedJob {
        if description.trim().is_empty() {
            return ParsedJob::default();
        }

        ParsedJob {
            company: self.company(description),
            job_title: self.job_title(description),
            pay_range: self.pay_range(description),
            employment_type: self.employment_type(description),
            benefits: self.benefits(description),
            job_link: self.job_link(description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> DescriptionExtractor {
        DescriptionExtractor::with_defaults().expect("default tables should compile")
    }

    const WELL_FORMED: &str = "Acme Corp\n\
        Senior Backend Engineer (Remote)\n\
        Full-time position. Salary: $100,000 - $140,000.\n\
        Benefits found in job post: Medical, Dental, 401k\n\
        Apply at https://jobs.lever.co/acme/123\n";

    #[test]
    fn test_well_formed_description_end_to_end() {
        let parsed = extractor().extract(WELL_FORMED);
        assert_eq!(parsed.company.as_deref(), Some("Acme Corp"));
        assert_eq!(
            parsed.job_title.as_deref(),
            Some("Senior Backend Engineer (Remote)")
        );
        assert_eq!(parsed.employment_type, Some(EmploymentType::FullTime));
        assert_eq!(parsed.pay_range.as_deref(), Some("$100000 - $140000"));
        assert_eq!(parsed.benefits.as_deref(), Some("Medical, Dental, 401k"));
        assert_eq!(parsed.job_link.as_deref(), Some("https://jobs.lever.co/acme/123"));
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let parsed = extractor().extract("");
        assert!(parsed.is_empty());
        let parsed = extractor().extract("   \n\t  ");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_unmatched_text_yields_empty_result() {
        // Single word: too short a first line for a company, no other cues.
        let parsed = extractor().extract("x");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_large_input_does_not_panic() {
        let big = "lorem ipsum dolor sit amet ".repeat(50_000);
        let parsed = extractor().extract(&big);
        assert!(parsed.pay_range.is_none());
        assert!(parsed.job_link.is_none());
    }

    #[test]
    fn test_absent_fields_serialize_as_absent_keys() {
        // First line too long for the company heuristic, and nothing else in
        // the text matches any strategy except the employment-type search.
        let text =
            "this full-time opening will definitely thrill everyone involved, truly and sincerely";
        let parsed = extractor().extract(text);
        let value = serde_json::to_value(&parsed).expect("result should serialize");
        let map = value.as_object().expect("result should be an object");
        assert_eq!(map.get("employmentType"), Some(&serde_json::json!("Full-time")));
        assert!(!map.contains_key("company"));
        assert!(!map.contains_key("jobTitle"));
        assert!(!map.contains_key("payRange"));
        assert!(!map.contains_key("benefits"));
        assert!(!map.contains_key("jobLink"));
    }

    #[test]
    fn test_malformed_layout_misreads_are_pinned() {
        // Pasted boilerplate ahead of the posting: the first-line heuristic
        // happily takes it as the company. Documented behavior, not intent.
        let text = "Save this posting for later\nStaff Engineer\n";
        let parsed = extractor().extract(text);
        assert_eq!(parsed.company.as_deref(), Some("Save this posting for later"));
        assert_eq!(parsed.job_title.as_deref(), Some("Staff Engineer"));
    }

    #[test]
    fn test_reduced_pattern_table_injection() {
        let config = ExtractorConfig {
            job_board_domains: vec!["example".to_string()],
            ..ExtractorConfig::default()
        };
        let ex = DescriptionExtractor::new(config).expect("reduced tables should compile");
        let text = "see https://boards.example/x and https://www.linkedin.com/jobs/9";
        assert_eq!(ex.job_link(text).as_deref(), Some("https://boards.example/x"));
    }

    #[test]
    fn test_employment_type_wire_format_round_trip() {
        for ty in EmploymentType::ALL {
            let json = serde_json::to_string(&ty).expect("type should serialize");
            let back: EmploymentType = serde_json::from_str(&json).expect("type should parse");
            assert_eq!(back, ty);
            assert_eq!(ty.as_str().parse::<EmploymentType>(), Ok(ty));
        }
    }
}
