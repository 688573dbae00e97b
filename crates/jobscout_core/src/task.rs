/// One search unit: a quoted job title and country query run against a search backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTask {
    pub query: String,
    pub country: String,
    pub tier: String,
}

impl SearchTask {
    pub fn new(query: impl Into<String>, country: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            country: country.into(),
            tier: tier.into(),
        }
    }
}

/// A named preference tier and the job titles searched under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleTier {
    pub tier: String,
    pub titles: Vec<String>,
}

impl TitleTier {
    pub fn new<I, S>(tier: impl Into<String>, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tier: tier.into(),
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Search text for one title/country pair: both terms quoted for exact matching.
pub fn search_query(title: &str, country: &str) -> String {
    format!("\"{title}\" \"{country}\"")
}

/// Expands the (tier, title) x country cross product into search tasks.
///
/// Order is tier, then title, then country, following the configured order. Callers
/// that want load spreading shuffle the result.
pub fn expand_tasks(tiers: &[TitleTier], countries: &[String]) -> Vec<SearchTask> {
    tiers
        .iter()
        .flat_map(|tier| {
            tier.titles.iter().flat_map(move |title| {
                countries.iter().map(move |country| {
                    SearchTask::new(
                        search_query(title, country),
                        country.as_str(),
                        tier.tier.as_str(),
                    )
                })
            })
        })
        .collect()
}
