use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Applicant-tracking hosts whose first path segment is the company slug, with the
/// segments that are routing prefixes rather than slugs.
const ATS_SLUG_RULES: &[(&str, &[&str])] = &[
    ("greenhouse.io", &["boards", "jobs"]),
    ("lever.co", &["jobs"]),
];

/// Boilerplate removed from posting titles before the company name is cut out.
/// Multi-word phrases come first so they win over their single-word prefixes.
const NOISE_WORDS: &[&str] = &[
    "Job Application for",
    "Career Opportunities",
    "Job Search",
    "Analyst",
    "Associate",
    "Hiring",
    "Careers",
    "Jobs",
    "at",
    "Inc",
    "LLC",
    "Ltd",
    "Partners",
    "Group",
    "Holdings",
];

const SEPARATORS: &[&str] = &[" - ", " | ", " \u{2013} "];

static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = NOISE_WORDS
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("noise pattern is valid")
});

/// Derives a company name from a posting's title and URL.
///
/// ATS URLs carrying a company slug win; otherwise noise words are stripped from the
/// title and the text before the first separator is used. `None` means the posting
/// yields no usable name and must be dropped.
pub fn extract_company_name(title: &str, url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        let host = parsed.host_str()?;
        if let Some(slug) = ats_slug(host, parsed.path()) {
            return Some(title_case(&slug.replace('-', " ")));
        }
    }
    company_from_title(title)
}

fn ats_slug<'a>(host: &str, path: &'a str) -> Option<&'a str> {
    let first = path.trim_matches('/').split('/').next()?;
    if first.is_empty() {
        return None;
    }
    ATS_SLUG_RULES
        .iter()
        .find(|(domain, _)| host.contains(domain))
        .filter(|(_, prefixes)| !prefixes.contains(&first))
        .map(|_| first)
}

fn company_from_title(title: &str) -> Option<String> {
    let cleaned = NOISE.replace_all(title, "");
    let head = SEPARATORS
        .iter()
        .filter_map(|sep| cleaned.find(sep))
        .min()
        .map_or(&*cleaned, |idx| &cleaned[..idx]);
    let company = head.split_whitespace().collect::<Vec<_>>().join(" ");
    if company.is_empty() {
        None
    } else {
        Some(company)
    }
}

/// Capitalizes the first letter of every alphabetic run and lowercases the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alpha = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_handles_digits_and_mixed_case() {
        assert_eq!(title_case("acme capital"), "Acme Capital");
        assert_eq!(title_case("ACME2go"), "Acme2Go");
    }

    #[test]
    fn greenhouse_routing_prefix_is_not_a_slug() {
        assert_eq!(ats_slug("boards.greenhouse.io", "/boards/123"), None);
        assert_eq!(
            ats_slug("boards.greenhouse.io", "/acme-capital/jobs/1"),
            Some("acme-capital")
        );
        assert_eq!(ats_slug("example.com", "/acme/jobs"), None);
    }
}
