use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{PageControl, TransportError};

/// One search result: visible heading text and the link it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultsPage {
    /// In document order.
    pub hits: Vec<SearchHit>,
    /// Control that loads the following results page, when there is one.
    pub next_page: Option<PageControl>,
}

impl ResultsPage {
    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Knows the shape of one search backend's result pages.
pub trait ResultsParser: Send + Sync {
    /// First results page for `query` on `endpoint`.
    fn search_url(&self, endpoint: &str, query: &str) -> Result<String, TransportError>;

    /// Element whose presence means the results have rendered.
    fn result_selector(&self) -> &str;

    fn parse(&self, html: &str) -> ResultsPage;
}

const RESULT_SELECTOR: &str = "article.result";
const NEXT_PAGE_LABEL: &str = "Next page";

/// Result pages of a SearXNG instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearxParser;

impl SearxParser {
    pub fn new() -> Self {
        Self
    }
}

impl ResultsParser for SearxParser {
    fn search_url(&self, endpoint: &str, query: &str) -> Result<String, TransportError> {
        let base = format!("{}/", endpoint.trim_end_matches('/'));
        let mut url = Url::parse(&base)
            .and_then(|base| base.join("search"))
            .map_err(|err| TransportError::InvalidUrl(format!("{endpoint}: {err}")))?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url.into())
    }

    fn result_selector(&self) -> &str {
        RESULT_SELECTOR
    }

    fn parse(&self, html: &str) -> ResultsPage {
        let document = Html::parse_document(html);
        ResultsPage {
            hits: result_hits(&document),
            next_page: next_page_control(&document),
        }
    }
}

fn result_hits(document: &Html) -> Vec<SearchHit> {
    let (Ok(article_sel), Ok(heading_sel), Ok(link_sel)) = (
        Selector::parse(RESULT_SELECTOR),
        Selector::parse("h3"),
        Selector::parse("a"),
    ) else {
        return Vec::new();
    };

    document
        .select(&article_sel)
        .filter_map(|article| {
            let heading = article.select(&heading_sel).next()?;
            let link = heading.select(&link_sel).next()?;
            let url = link.value().attr("href")?.trim().to_string();
            let title = collapsed_text(heading);
            (!url.is_empty() && !title.is_empty()).then_some(SearchHit { title, url })
        })
        .collect()
}

fn next_page_control(document: &Html) -> Option<PageControl> {
    let form_sel = Selector::parse("form").ok()?;
    let button_sel = Selector::parse("button").ok()?;
    let input_sel = Selector::parse("input[name]").ok()?;

    let form = document.select(&form_sel).find(|form| {
        form.select(&button_sel)
            .any(|button| button.text().collect::<String>().contains(NEXT_PAGE_LABEL))
    })?;

    let fields = form
        .select(&input_sel)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    Some(PageControl {
        action: form.value().attr("action").unwrap_or_default().to_string(),
        fields,
    })
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
