use std::time::Duration;

use jobscout_engine::{
    Browser, FetchSettings, HttpBrowser, PageControl, ResultsParser, SearchHit, SearxParser,
    TransportError,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_ONE: &str = r#"<html><body>
<div id="urls">
  <article class="result result-default">
    <a href="https://boards.greenhouse.io/acme-capital/jobs/1" class="url_header">boards.greenhouse.io</a>
    <h3><a href="https://boards.greenhouse.io/acme-capital/jobs/1">Quantitative <span class="highlight">Analyst</span> at Acme Capital</a></h3>
    <p class="content">Join us</p>
  </article>
  <article class="result">
    <h3>No link in this heading</h3>
  </article>
  <article class="result">
    <h3><a href="https://www.linkedin.com/in/someone">  Someone
       Profile </a></h3>
  </article>
</div>
<nav id="pagination">
  <form method="POST" action="/search" class="previous_page">
    <input type="hidden" name="q" value="&quot;Quantitative Analyst&quot; &quot;USA&quot;">
    <input type="hidden" name="pageno" value="0">
    <button type="submit">Previous page</button>
  </form>
  <form method="POST" action="/search" class="next_page">
    <input type="hidden" name="q" value="&quot;Quantitative Analyst&quot; &quot;USA&quot;">
    <input type="hidden" name="pageno" value="2">
    <input type="hidden" name="language" value="auto">
    <button type="submit" role="link">Next page</button>
  </form>
</nav>
</body></html>"#;

const PAGE_TWO: &str = r#"<html><body>
<article class="result"><h3><a href="https://jobs.lever.co/two-sigma/abc">Senior Analyst</a></h3></article>
</body></html>"#;

#[test]
fn hits_are_extracted_in_document_order() {
    let page = SearxParser::new().parse(PAGE_ONE);

    assert_eq!(
        page.hits,
        vec![
            SearchHit {
                title: "Quantitative Analyst at Acme Capital".to_string(),
                url: "https://boards.greenhouse.io/acme-capital/jobs/1".to_string(),
            },
            SearchHit {
                title: "Someone Profile".to_string(),
                url: "https://www.linkedin.com/in/someone".to_string(),
            },
        ]
    );
}

#[test]
fn next_page_form_carries_its_fields() {
    let page = SearxParser::new().parse(PAGE_ONE);

    assert_eq!(
        page.next_page,
        Some(PageControl {
            action: "/search".to_string(),
            fields: vec![
                ("q".to_string(), "\"Quantitative Analyst\" \"USA\"".to_string()),
                ("pageno".to_string(), "2".to_string()),
                ("language".to_string(), "auto".to_string()),
            ],
        })
    );
}

#[test]
fn last_page_has_no_next_control() {
    let page = SearxParser::new().parse(PAGE_TWO);
    assert_eq!(page.hits.len(), 1);
    assert!(!page.has_next_page());
}

#[test]
fn search_url_quotes_query_and_keeps_endpoint_path() {
    let parser = SearxParser::new();
    assert_eq!(
        parser
            .search_url("https://searx.example", "\"Quant\" \"USA\"")
            .unwrap(),
        "https://searx.example/search?q=%22Quant%22+%22USA%22"
    );
    assert_eq!(
        parser.search_url("https://darmarit.org/searx/", "fp&a").unwrap(),
        "https://darmarit.org/searx/search?q=fp%26a"
    );
    assert!(parser.search_url("nonsense", "q").is_err());
}

#[test]
fn http_tab_walks_result_pages() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("pageno", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_TWO, "text/html"))
            .with_priority(1)
            .mount(&server),
    );
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "\"Quantitative Analyst\" \"USA\""))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_ONE, "text/html"))
            .mount(&server),
    );

    let parser = SearxParser::new();
    let mut tab = HttpBrowser::new(FetchSettings::default()).open_tab().unwrap();
    let url = parser
        .search_url(&server.uri(), "\"Quantitative Analyst\" \"USA\"")
        .unwrap();

    tab.navigate(&url).unwrap();
    tab.wait_for_element(parser.result_selector(), Duration::from_secs(1))
        .unwrap();
    let first = parser.parse(&tab.page_html().unwrap());
    let next = first.next_page.expect("next page control");

    tab.activate(&next).unwrap();
    let second = parser.parse(&tab.page_html().unwrap());
    assert_eq!(second.hits[0].title, "Senior Analyst");
    assert!(second.next_page.is_none());

    tab.close();
    assert_eq!(tab.page_html(), Err(TransportError::NoPage));
}

#[test]
fn missing_results_element_is_a_transport_failure() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<html><p>rate limited</p></html>", "text/html"),
            )
            .mount(&server),
    );

    let mut tab = HttpBrowser::default().open_tab().unwrap();
    tab.navigate(&format!("{}/search?q=x", server.uri())).unwrap();
    let err = tab
        .wait_for_element("article.result", Duration::from_millis(50))
        .unwrap_err();
    assert_eq!(
        err,
        TransportError::ElementMissing {
            selector: "article.result".to_string(),
            waited: Duration::from_millis(50),
        }
    );
}
