use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::fetch::{FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
use crate::TransportError;

/// A navigation control found on a page: the target `action` (relative or absolute)
/// and the form fields submitted with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageControl {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

/// One tab owned by exactly one scraper for the whole run.
pub trait BrowserSession: Send {
    fn navigate(&mut self, url: &str) -> Result<(), TransportError>;

    /// Waits until `selector` matches on the current page, failing after `timeout`.
    fn wait_for_element(&mut self, selector: &str, timeout: Duration)
        -> Result<(), TransportError>;

    fn page_html(&self) -> Result<String, TransportError>;

    /// Clicks `control`, loading whatever page it leads to.
    fn activate(&mut self, control: &PageControl) -> Result<(), TransportError>;

    fn close(&mut self);
}

pub trait Browser: Send + Sync {
    fn open_tab(&self) -> Result<Box<dyn BrowserSession>, TransportError>;
}

/// Browser over plain HTTP: every tab is a reqwest client driven by its own
/// single-threaded runtime.
#[derive(Debug, Clone, Default)]
pub struct HttpBrowser {
    settings: FetchSettings,
}

impl HttpBrowser {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }
}

impl Browser for HttpBrowser {
    fn open_tab(&self) -> Result<Box<dyn BrowserSession>, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| TransportError::Session(err.to_string()))?;
        let fetcher = ReqwestFetcher::new(self.settings.clone())?;
        Ok(Box::new(HttpTab {
            runtime: Some(runtime),
            fetcher,
            page: None,
        }))
    }
}

struct HttpTab {
    runtime: Option<tokio::runtime::Runtime>,
    fetcher: ReqwestFetcher,
    page: Option<FetchedPage>,
}

impl HttpTab {
    fn current(&self) -> Result<&FetchedPage, TransportError> {
        self.page.as_ref().ok_or(TransportError::NoPage)
    }
}

impl BrowserSession for HttpTab {
    fn navigate(&mut self, url: &str) -> Result<(), TransportError> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| TransportError::Session("tab is closed".to_string()))?;
        let page = runtime.block_on(self.fetcher.fetch(url))?;
        self.page = Some(page);
        Ok(())
    }

    fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), TransportError> {
        let page = self.current()?;
        let missing = || TransportError::ElementMissing {
            selector: selector.to_string(),
            waited: timeout,
        };
        let parsed = Selector::parse(selector).map_err(|_| missing())?;
        let document = Html::parse_document(&page.html);
        if document.select(&parsed).next().is_some() {
            Ok(())
        } else {
            Err(missing())
        }
    }

    fn page_html(&self) -> Result<String, TransportError> {
        Ok(self.current()?.html.clone())
    }

    fn activate(&mut self, control: &PageControl) -> Result<(), TransportError> {
        let base = Url::parse(&self.current()?.final_url)
            .map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
        let target = control_url(&base, control)?;
        self.navigate(target.as_str())
    }

    fn close(&mut self) {
        self.page = None;
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Resolves a GET form submission: the action against `base`, with the form fields
/// replacing any query the action carried.
fn control_url(base: &Url, control: &PageControl) -> Result<Url, TransportError> {
    let mut target = base
        .join(&control.action)
        .map_err(|err| TransportError::InvalidUrl(format!("{}: {err}", control.action)))?;
    if !control.fields.is_empty() {
        target.set_query(None);
        target
            .query_pairs_mut()
            .extend_pairs(control.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(target)
}
