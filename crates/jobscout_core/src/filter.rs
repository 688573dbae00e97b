/// Allowlist of posting hosts: a URL is accepted when it contains any pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFilter {
    patterns: Vec<String>,
}

impl SiteFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim().is_empty())
                .collect(),
        }
    }

    pub fn accepts(&self, url: &str) -> bool {
        self.patterns.iter().any(|pattern| url.contains(pattern.as_str()))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::SiteFilter;

    #[test]
    fn substring_match_against_any_pattern() {
        let filter = SiteFilter::new(["boards.greenhouse.io", "linkedin.com/jobs/view"]);
        assert!(filter.accepts("https://boards.greenhouse.io/acme/jobs/1"));
        assert!(filter.accepts("https://www.linkedin.com/jobs/view/42"));
        assert!(!filter.accepts("https://www.linkedin.com/in/someone"));
    }

    #[test]
    fn blank_patterns_are_ignored() {
        let filter = SiteFilter::new(["", "  "]);
        assert!(filter.patterns().is_empty());
        assert!(!filter.accepts("https://anything.example"));
    }
}
