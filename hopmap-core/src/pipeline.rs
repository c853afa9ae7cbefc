use crate::report::RouteReport;
use hopmap_resolver::{Resolver, extract};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Options for one extract-and-resolve run.
pub struct PipelineOptions {
    pub timeout_secs: u64,
    pub endpoint: Option<String>,
    pub skip_private: bool,
    pub dedup: bool,
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            endpoint: None,
            skip_private: false,
            dedup: false,
            show_progress: false,
        }
    }
}

/// Callback for reporting pipeline phase messages.
pub type PipelineProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Run the whole discovery pipeline over an HTML document: extract hop
/// records from the table, then resolve them one at a time.
///
/// No stage failure is terminal; a bad row or a failed lookup only shrinks
/// the output.
pub async fn execute_pipeline(
    html: &str,
    options: PipelineOptions,
    progress_callback: Option<PipelineProgressCallback>,
) -> Result<RouteReport, String> {
    let PipelineOptions {
        timeout_secs,
        endpoint,
        skip_private,
        dedup,
        show_progress,
    } = options;

    let records = extract::extract_hops(html);
    let discovered = records.len();
    info!("Discovered {} address(es)", discovered);

    if let Some(ref callback) = progress_callback {
        callback(format!("Discovered {} address(es)", discovered));
    }

    if records.is_empty() {
        return Ok(RouteReport::new(0, Vec::new()));
    }

    // Busy indicator for the duration of the resolve phase; fire-and-forget,
    // no cancellation.
    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Resolving addresses...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut resolver = Resolver::with_timeout(timeout_secs)
        .with_skip_private(skip_private)
        .with_dedup(dedup);

    if let Some(endpoint) = endpoint {
        Url::parse(&endpoint).map_err(|e| format!("Invalid endpoint {}: {}", endpoint, e))?;
        resolver = resolver.with_endpoint(endpoint);
    }

    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        resolver = resolver.with_progress_callback(Arc::new(move |index, address| {
            pb_clone.set_message(format!("Resolving {}: {}", index + 1, address));
            pb_clone.tick();
        }));
    }

    let locations = resolver.resolve(&records).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Resolved {} of {} address(es)",
            locations.len(),
            discovered
        ));
    }

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Resolved {} of {} address(es)",
            locations.len(),
            discovered
        ));
    }

    Ok(RouteReport::new(discovered, locations))
}

/// Build a route straight from the location list embedded in the document,
/// skipping the resolver entirely.
pub fn embedded_route(html: &str) -> RouteReport {
    let locations = extract::extract_embedded_locations(html);
    RouteReport::new(locations.len(), locations)
}
