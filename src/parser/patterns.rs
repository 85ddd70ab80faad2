//! Pattern tables for the description extractor.
//!
//! All stoplists, keyword lists, and regex sources live here as plain
//! configuration data so a reduced table can be injected for testing. The
//! extractor compiles one immutable `PatternSet` from a config and never
//! mutates it afterwards.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Error type for pattern compilation.
#[derive(Debug)]
pub enum PatternError {
    /// A regex source in the table is invalid.
    Regex(String),
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regex(e) => write!(f, "invalid regex: {e}"),
        }
    }
}

impl std::error::Error for PatternError {}

impl From<regex::Error> for PatternError {
    fn from(err: regex::Error) -> Self {
        Self::Regex(err.to_string())
    }
}

/// Configuration data for the extractor.
///
/// Word lists are matched lowercase; the fallback limit bounds the raw
/// benefits block when no list items were found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Generic words that disqualify a line from being a company name.
    pub company_stoplist: Vec<String>,

    /// UI-chrome tokens that disqualify a line from being a job title.
    pub title_stoplist: Vec<String>,

    /// Role words that qualify a line as a job title.
    pub title_role_keywords: Vec<String>,

    /// Words that qualify a list item as a benefit.
    pub benefits_keywords: Vec<String>,

    /// Hostname fragments of known job boards, preferred when ranking links.
    pub job_board_domains: Vec<String>,

    /// Character cap for the raw benefits block fallback.
    pub benefits_fallback_limit: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            company_stoplist: to_strings(&[
                "the", "a", "an", "we", "our", "your", "united", "states", "about", "job",
                "position",
            ]),
            title_stoplist: to_strings(&[
                "united",
                "states",
                "days",
                "ago",
                "applicants",
                "promoted",
                "actively",
                "reviewing",
            ]),
            title_role_keywords: to_strings(&[
                "engineer",
                "developer",
                "manager",
                "analyst",
                "designer",
                "specialist",
                "coordinator",
                "director",
                "lead",
                "senior",
                "junior",
                "intern",
                "assistant",
                "executive",
                "officer",
                "representative",
                "associate",
                "consultant",
                "architect",
                "programmer",
                "technician",
            ]),
            benefits_keywords: to_strings(&[
                "insurance",
                "401k",
                "pto",
                "time off",
                "sick leave",
                "dental",
                "vision",
                "medical",
                "retirement",
                "stock",
                "options",
                "bonus",
                "vacation",
                "holiday",
            ]),
            job_board_domains: to_strings(&[
                "linkedin",
                "indeed",
                "glassdoor",
                "monster",
                "ziprecruiter",
                "dice",
                "stackoverflow",
                "github",
                "lever",
                "greenhouse",
                "workday",
            ]),
            benefits_fallback_limit: 200,
        }
    }
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

/// Pay bound: digits with optional thousands separators and a trailing k/K.
const PAY_BOUND: &str = r"\d{1,3}(?:,\d{3})*[kK]?";

/// Compiled regexes for one extractor instance.
///
/// The cascade order of each `Vec` is the confidence ranking: more structural
/// cues come first, generic ones last.
#[derive(Debug)]
pub(crate) struct PatternSet {
    pub company_about: Regex,
    pub company_relational: Vec<Regex>,
    pub title_label: Regex,
    pub title_anchored: Vec<Regex>,
    pub pay: Vec<Regex>,
    pub benefits_label_line: Regex,
    pub benefits_numbered: Regex,
    pub benefits_bulleted: Regex,
    pub benefits_block: Regex,
    pub url_job_board: Regex,
    pub url_any: Regex,
}

impl PatternSet {
    pub(crate) fn compile(config: &ExtractorConfig) -> Result<Self, PatternError> {
        let bound = PAY_BOUND;
        let domains = config
            .job_board_domains
            .iter()
            .map(|d| regex::escape(d))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            company_about: Regex::new(r"(?i:about\s+us)[:\s]+([A-Z][A-Za-z0-9&.,\- ]{1,48})")?,
            company_relational: vec![
                Regex::new(
                    r"(?:at|with|from|join)\s+([A-Z][A-Za-z0-9\s&.,-]+?)(?:\s+is|\s+seeks|\s+looking|\s+hiring|,|\.|\n|$)",
                )?,
                Regex::new(r"^([A-Z][A-Za-z0-9\s&.,-]+?)\s+(?:is|seeks|looking|hiring|a|an)")?,
                Regex::new(r"(?i:company)[:\s]+([A-Z][A-Za-z0-9\s&.,-]+?)(?:\n|,|\.|$)")?,
                Regex::new(r"(?i:organization)[:\s]+([A-Z][A-Za-z0-9\s&.,-]+?)(?:\n|,|\.|$)")?,
            ],
            title_label: Regex::new(r"(?i:job\s+title|position|role|title|opening):\s*([^\n]+)")?,
            title_anchored: vec![
                Regex::new(
                    r"(?i:we\s+are\s+hiring|looking\s+for|seeking|hiring)\s+(?:[Aa]n?\s+)?([A-Z][A-Za-z ]+?)\s+(?i:developer|engineer|manager|analyst|designer|specialist)",
                )?,
                Regex::new(
                    r"(?m)^([A-Z][A-Za-z ]+?)\s+(?i:developer|engineer|manager|analyst|designer|specialist|coordinator|director|lead|senior|junior)",
                )?,
            ],
            pay: vec![
                Regex::new(&format!(
                    r"\$({bound})\s*/\s*yr\s*[-–—]\s*\$({bound})\s*/\s*yr"
                ))?,
                Regex::new(&format!(r"\$({bound})\s*[-–—]\s*\$({bound})"))?,
                Regex::new(&format!(
                    r"(\$?{bound})\s*[-–—]\s*(\$?{bound})\s*(?i:per\s+year|annually|per\s+hour|hourly|yr|year)"
                ))?,
                Regex::new(&format!(
                    r"(?i:salary)[:\s]+(\$?{bound})(?:\s*[-–—]\s*(\$?{bound}))?"
                ))?,
                Regex::new(&format!(
                    r"(?i:compensation)[:\s]+(\$?{bound})(?:\s*[-–—]\s*(\$?{bound}))?"
                ))?,
                Regex::new(&format!(
                    r"(?i:ranges\s+from)\s+(\$?{bound})\s+(?i:to)\s+(\$?{bound})"
                ))?,
                Regex::new(&format!(
                    r"({bound})\s*[-–—]\s*({bound})\s*(?i:dollars?|USD)"
                ))?,
            ],
            benefits_label_line: Regex::new(r"(?i:benefits\s+found\s+in\s+job\s+post):\s*([^\n]+)")?,
            benefits_numbered: Regex::new(r"(?m)^\s*\d+\.\s*(.+)$")?,
            benefits_bulleted: Regex::new(r"(?m)^\s*[-•*]\s*(.+)$")?,
            benefits_block: Regex::new(
                r"(?i:benefits(?:\s+found\s+in\s+job\s+post)?):\s*([^\n]+(?:\n[^\n]*){0,15})",
            )?,
            url_job_board: Regex::new(&format!(r"(?i)https?://[^\s)]*(?:{domains})[^\s)]+"))?,
            url_any: Regex::new(r"https?://[^\s)]+")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_compiles() {
        let config = ExtractorConfig::default();
        assert!(PatternSet::compile(&config).is_ok());
    }

    #[test]
    fn test_domains_are_escaped() {
        let config = ExtractorConfig {
            job_board_domains: vec!["jobs.example".to_string()],
            ..ExtractorConfig::default()
        };
        let set = PatternSet::compile(&config).expect("config should compile");
        assert!(set.url_job_board.is_match("https://jobs.example/listing/1"));
        // The dot must not act as a wildcard.
        assert!(!set.url_job_board.is_match("https://jobsxexample/listing/1"));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = ExtractorConfig::default();
        let json = serde_json::to_string(&config).expect("config should serialize");
        let back: ExtractorConfig = serde_json::from_str(&json).expect("config should deserialize");
        assert_eq!(back.company_stoplist, config.company_stoplist);
        assert_eq!(back.benefits_fallback_limit, config.benefits_fallback_limit);
    }

    #[test]
    fn test_pay_bound_shape() {
        let re = Regex::new(&format!("^{PAY_BOUND}$")).expect("bound should compile");
        assert!(re.is_match("120,000"));
        assert!(re.is_match("80k"));
        assert!(re.is_match("95K"));
        assert!(!re.is_match("1234567"));
    }
}
