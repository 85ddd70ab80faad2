//! Per-field extraction cascades.
//!
//! Each field is a short-circuiting ordered list of strategies; the first one
//! that produces a validated value wins. Company and title patterns anchor on
//! original-case capital letters, while the employment-type search lowercases
//! the whole text first. That asymmetry is intentional.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{DescriptionExtractor, EmploymentType};

/// Separators for inline benefit lists ("Medical, Dental • 401k").
static LIST_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;•]").expect("list split regex"));

impl DescriptionExtractor {
    pub(crate) fn company(&self, text: &str) -> Option<String> {
        self.company_from_first_line(text)
            .or_else(|| self.company_from_about(text))
            .or_else(|| self.company_from_relational(text))
    }

    /// Strategy 1: the first non-empty line, unless it looks like scraped
    /// listing chrome (middot, "ago") or is built from generic words only.
    fn company_from_first_line(&self, text: &str) -> Option<String> {
        let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
        if !(2..=49).contains(&line.chars().count()) {
            return None;
        }
        let lower = line.to_lowercase();
        if line.contains('·') || lower.contains("ago") {
            return None;
        }
        if self.all_words_stoplisted(&lower) {
            return None;
        }
        Some(line.to_string())
    }

    /// Strategy 2: "About Us:" label followed by a capitalized phrase.
    fn company_from_about(&self, text: &str) -> Option<String> {
        let caps = self.patterns.company_about.captures(text)?;
        self.accept_company(caps[1].trim(), false)
    }

    /// Strategy 3: relational patterns ("at X", "X is hiring", "Company: X").
    fn company_from_relational(&self, text: &str) -> Option<String> {
        for re in &self.patterns.company_relational {
            if let Some(caps) = re.captures(text) {
                if let Some(company) = self.accept_company(caps[1].trim(), true) {
                    return Some(company);
                }
            }
        }
        None
    }

    fn accept_company(&self, candidate: &str, reject_academic: bool) -> Option<String> {
        if !(2..=49).contains(&candidate.chars().count()) {
            return None;
        }
        let lower = candidate.to_lowercase();
        if self.all_words_stoplisted(&lower) {
            return None;
        }
        // Degree requirements ("University of X") are not employers.
        if reject_academic && (lower.contains("university") || lower.contains("school")) {
            return None;
        }
        Some(candidate.to_string())
    }

    /// True when every word of the (lowercased) candidate is a stoplist word,
    /// e.g. "United States" or "About the job".
    fn all_words_stoplisted(&self, lower: &str) -> bool {
        let mut seen_any = false;
        for word in lower.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            if word.is_empty() {
                continue;
            }
            seen_any = true;
            if !self.config.company_stoplist.iter().any(|s| s == word) {
                return false;
            }
        }
        seen_any
    }

    pub(crate) fn job_title(&self, text: &str) -> Option<String> {
        self.title_from_second_line(text)
            .or_else(|| self.title_from_label(text))
            .or_else(|| self.title_from_anchored(text))
    }

    /// Strategy 1: the second non-empty line, when it reads like a role name
    /// rather than listing chrome ("3 days ago", "500 applicants").
    fn title_from_second_line(&self, text: &str) -> Option<String> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        lines.next()?;
        let second = lines.next()?;
        if !(4..=99).contains(&second.chars().count()) || second.contains('·') {
            return None;
        }
        let lower = second.to_lowercase();
        let chrome = lower.split_whitespace().any(|word| {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            self.config.title_stoplist.iter().any(|s| s == word)
        });
        if chrome {
            return None;
        }
        let has_role = self
            .config
            .title_role_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()));
        if has_role || second.contains('(') || second.contains(')') {
            return Some(second.to_string());
        }
        None
    }

    /// Strategy 2: explicit labels, capturing the rest of the line.
    fn title_from_label(&self, text: &str) -> Option<String> {
        let caps = self.patterns.title_label.captures(text)?;
        accept_title(caps[1].trim())
    }

    /// Strategy 3: "hiring/seeking a <Phrase> engineer" anchored forms.
    fn title_from_anchored(&self, text: &str) -> Option<String> {
        for re in &self.patterns.title_anchored {
            if let Some(caps) = re.captures(text) {
                if let Some(title) = accept_title(caps[1].trim()) {
                    return Some(title);
                }
            }
        }
        None
    }

    pub(crate) fn pay_range(&self, text: &str) -> Option<String> {
        for re in &self.patterns.pay {
            if let Some(caps) = re.captures(text) {
                let Some(min) = caps.get(1) else { continue };
                let min = normalize_pay_bound(min.as_str());
                if min.is_empty() {
                    continue;
                }
                let max = caps
                    .get(2)
                    .map(|m| normalize_pay_bound(m.as_str()))
                    .filter(|m| !m.is_empty());
                return Some(match max {
                    Some(max) => format!("${min} - ${max}"),
                    None => format!("${min}"),
                });
            }
        }
        None
    }

    /// Fixed priority: a posting mentioning both "full-time" and "internship"
    /// resolves to Full-time.
    pub(crate) fn employment_type(&self, text: &str) -> Option<EmploymentType> {
        let lower = text.to_lowercase();
        if lower.contains("full-time") || lower.contains("full time") {
            Some(EmploymentType::FullTime)
        } else if lower.contains("part-time") || lower.contains("part time") {
            Some(EmploymentType::PartTime)
        } else if lower.contains("contract") {
            Some(EmploymentType::Contract)
        } else if lower.contains("internship") || lower.contains("intern") {
            Some(EmploymentType::Internship)
        } else {
            None
        }
    }

    pub(crate) fn benefits(&self, text: &str) -> Option<String> {
        let mut items: Vec<String> = Vec::new();

        if let Some(caps) = self.patterns.benefits_label_line.captures(text) {
            for part in LIST_SPLIT.split(&caps[1]) {
                let part = part.trim();
                if !part.is_empty() {
                    items.push(part.to_string());
                }
            }
        }
        for caps in self.patterns.benefits_numbered.captures_iter(text) {
            self.push_benefit_item(&caps[1], &mut items);
        }
        for caps in self.patterns.benefits_bulleted.captures_iter(text) {
            self.push_benefit_item(&caps[1], &mut items);
        }

        if !items.is_empty() {
            let mut seen = std::collections::HashSet::new();
            let mut out = Vec::new();
            for item in items {
                let normalized = capitalize_phrase(item.trim());
                if !normalized.is_empty() && seen.insert(normalized.to_lowercase()) {
                    out.push(normalized);
                }
            }
            if !out.is_empty() {
                return Some(out.join(", "));
            }
        }

        // No list items found: fall back to the raw labeled block, capped.
        let caps = self.patterns.benefits_block.captures(text)?;
        let block = caps[1].trim();
        if block.is_empty() {
            return None;
        }
        Some(crate::utils::truncate_chars(
            block,
            self.config.benefits_fallback_limit,
        ))
    }

    /// Keep a list item only when it names a benefit, and only up to its
    /// first period.
    fn push_benefit_item(&self, raw: &str, items: &mut Vec<String>) {
        let lower = raw.to_lowercase();
        if self
            .config
            .benefits_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
        {
            let head = raw.split('.').next().unwrap_or(raw).trim();
            if !head.is_empty() {
                items.push(head.to_string());
            }
        }
    }

    pub(crate) fn job_link(&self, text: &str) -> Option<String> {
        self.patterns
            .url_job_board
            .find(text)
            .or_else(|| self.patterns.url_any.find(text))
            .map(|m| m.as_str().to_string())
    }
}

fn accept_title(candidate: &str) -> Option<String> {
    if (3..=99).contains(&candidate.chars().count()) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// First letter up, the rest down: "medical Insurance" -> "Medical insurance".
fn capitalize_phrase(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Strip everything but digits and k/K from a pay bound, lowercasing a
/// trailing K: "$120,000" -> "120000", "80K" -> "80k".
fn normalize_pay_bound(raw: &str) -> String {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'k' || *c == 'K')
        .collect();
    if cleaned.ends_with('K') {
        cleaned.pop();
        cleaned.push('k');
    }
    cleaned
}
