use jobscout_core::{
    extract_company_name, JobRecord, QueueClosed, SearchTask, StatusMsg, WorkerId, WorkerPhase,
};
use pipeline_logging::{
    clear_worker_label, pipeline_debug, pipeline_error, pipeline_info, pipeline_warn,
    set_worker_label,
};
use rand::seq::SliceRandom;
use rand::Rng;
use url::Url;

use super::WorkerContext;
use crate::{BrowserSession, SearchHit, TransportError};

/// Why a task stopped before its last page.
enum CrawlStop {
    Transport(TransportError),
    /// The analysis queue was closed by an interrupt.
    Closed,
}

impl From<TransportError> for CrawlStop {
    fn from(err: TransportError) -> Self {
        CrawlStop::Transport(err)
    }
}

impl From<QueueClosed> for CrawlStop {
    fn from(_: QueueClosed) -> Self {
        CrawlStop::Closed
    }
}

/// Scraper loop: drains the task queue without blocking, one task at a time,
/// on the session this worker owns for the whole run.
pub(super) fn run_scraper(ctx: &WorkerContext, id: WorkerId, mut session: Box<dyn BrowserSession>) {
    set_worker_label(id.thread_name());
    set_phase(ctx, id, WorkerPhase::Starting, "");

    while !ctx.stop.is_set() {
        let Some(task) = ctx.tasks.try_dequeue() else {
            break;
        };
        let _done = ctx.tasks.task_guard();
        ctx.report_levels();
        process_task(ctx, id, session.as_mut(), &task);
    }

    session.close();
    set_phase(ctx, id, WorkerPhase::Finished, "");
    pipeline_info!("Scraper finished");
    clear_worker_label();
}

fn process_task(ctx: &WorkerContext, id: WorkerId, session: &mut dyn BrowserSession, task: &SearchTask) {
    set_phase(ctx, id, WorkerPhase::Searching, &task.query);

    let Some(endpoint) = ctx.settings.search_endpoints.choose(&mut rand::thread_rng()) else {
        return;
    };
    pipeline_debug!("Searching {:?} on {endpoint}", task.query);

    match crawl(ctx, id, session, task, endpoint) {
        Ok(()) => {}
        Err(CrawlStop::Transport(err)) => {
            let host = endpoint_host(endpoint);
            pipeline_warn!("Abandoning {:?} on {host}: {err}", task.query);
            ctx.report(StatusMsg::TransportFailure { scraper: id, host });
        }
        Err(CrawlStop::Closed) => {
            pipeline_debug!("Analysis queue closed while searching {:?}", task.query);
        }
    }
}

/// Walks up to `max_pages_per_query` result pages of one task.
fn crawl(
    ctx: &WorkerContext,
    id: WorkerId,
    session: &mut dyn BrowserSession,
    task: &SearchTask,
    endpoint: &str,
) -> Result<(), CrawlStop> {
    let max_pages = ctx.settings.max_pages_per_query;
    for page in 0..max_pages {
        if ctx.stop.is_set() {
            break;
        }
        if page == 0 {
            let url = ctx.parser.search_url(endpoint, &task.query)?;
            session.navigate(&url)?;
        }
        session.wait_for_element(ctx.parser.result_selector(), ctx.settings.page_wait)?;
        let results = ctx.parser.parse(&session.page_html()?);

        for hit in &results.hits {
            consider(ctx, id, task, hit)?;
        }

        let Some(next_page) = results.next_page else {
            break;
        };
        if page + 1 == max_pages {
            break;
        }
        session.activate(&next_page)?;
        if backoff(ctx) {
            break;
        }
    }
    Ok(())
}

/// Filters, dedups and enqueues one search hit.
fn consider(ctx: &WorkerContext, id: WorkerId, task: &SearchTask, hit: &SearchHit) -> Result<(), QueueClosed> {
    if !ctx.settings.site_filter.accepts(&hit.url) {
        return Ok(());
    }
    if !ctx.store.try_claim_url(&hit.url) {
        return Ok(());
    }
    let Some(company) = extract_company_name(&hit.title, &hit.url) else {
        pipeline_debug!("No company name in {:?}", hit.title);
        return Ok(());
    };

    let job = JobRecord::discovered(task, &hit.title, company, &hit.url);
    // Only queued records reach the unfiltered sink.
    ctx.jobs.enqueue(job.clone())?;
    if let Err(err) = ctx.sinks.record_discovery(&job) {
        pipeline_error!("Failed to record discovery {}: {err}", job.source_url);
    }
    ctx.report(StatusMsg::JobFound {
        scraper: id,
        title: hit.title.clone(),
        backlog: ctx.jobs.pending_count(),
    });
    Ok(())
}

/// Random pause between result pages. Returns `true` when cut short by stop.
fn backoff(ctx: &WorkerContext) -> bool {
    let (min, max) = ctx.settings.page_backoff;
    let pause = if min < max {
        rand::thread_rng().gen_range(min..=max)
    } else {
        min
    };
    ctx.stop.sleep(pause)
}

fn set_phase(ctx: &WorkerContext, id: WorkerId, phase: WorkerPhase, label: &str) {
    ctx.report(StatusMsg::WorkerPhase {
        id,
        phase,
        label: label.to_string(),
    });
}

fn endpoint_host(endpoint: &str) -> String {
    Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| endpoint.to_string())
}

#[cfg(test)]
mod tests {
    use super::endpoint_host;

    #[test]
    fn host_is_taken_from_endpoint_url() {
        assert_eq!(endpoint_host("https://searx.example/"), "searx.example");
        assert_eq!(endpoint_host("https://darmarit.org/searx/"), "darmarit.org");
        assert_eq!(endpoint_host("not a url"), "not a url");
    }
}
