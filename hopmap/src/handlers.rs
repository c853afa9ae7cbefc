use clap::ArgMatches;
use colored::Colorize;
use hopmap_core::map::MapOptions;
use hopmap_core::pipeline::{PipelineOptions, embedded_route, execute_pipeline};
use hopmap_resolver::lookup::DEFAULT_ENDPOINT;
use hopmap_resolver::{HopRecord, Resolver, extract};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

// Re-export report types and functions from hopmap-core
pub use hopmap_core::report::{
    ReportFormat, RouteReport, generate_html_report, generate_json_report, generate_text_report,
    save_report,
};

// Helper functions for the map and resolve handlers

/// Read an HTML document from disk, expanding a leading tilde.
pub fn load_document(path: &PathBuf) -> Result<String, String> {
    let expanded = expand_path(path);
    fs::read_to_string(&expanded)
        .map_err(|e| format!("Failed to read input {}: {}", expanded.display(), e))
}

/// Load addresses from either the positional arguments or a file.
pub fn load_addresses_from_source(
    addresses: &[String],
    addresses_file: Option<&PathBuf>,
) -> Result<Vec<HopRecord>, String> {
    if let Some(path) = addresses_file {
        load_addresses_from_file(path)
    } else if !addresses.is_empty() {
        let records: Vec<HopRecord> = addresses
            .iter()
            .filter_map(|line| parse_address_line(line))
            .collect();

        if records.is_empty() {
            return Err("No valid addresses provided".to_string());
        }

        Ok(records)
    } else {
        Err("Either addresses or --addresses-file must be provided".to_string())
    }
}

/// Load and parse addresses from a newline-delimited file.
pub fn load_addresses_from_file(path: &PathBuf) -> Result<Vec<HopRecord>, String> {
    let content = fs::read_to_string(expand_path(path))
        .map_err(|e| format!("Failed to read addresses file {}: {}", path.display(), e))?;

    let records: Vec<HopRecord> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_address_line(line.trim()))
        .collect();

    if records.is_empty() {
        return Err(format!("No valid addresses found in {}", path.display()));
    }

    Ok(records)
}

/// Parse a single line as an address, taking the first IP token on it.
pub fn parse_address_line(line: &str) -> Option<HopRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match extract::scan_addresses(trimmed).into_iter().next() {
        Some(address) => Some(HopRecord::bare(address)),
        None => {
            eprintln!("⚠️  Skipping invalid address '{}'", trimmed);
            None
        }
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy().to_string();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

fn write_output(content: &str, output: Option<&PathBuf>) {
    match output {
        Some(path) => {
            let expanded = expand_path(path);
            match save_report(content, &expanded) {
                Ok(()) => {
                    println!(
                        "{} Written to {}",
                        "✓".green().bold(),
                        expanded.display().to_string().bright_white()
                    );
                }
                Err(e) => {
                    eprintln!("✗ Failed to write {}: {}", expanded.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => print!("{}", content),
    }
}

fn resolve_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Resolving addresses...");
    spinner
}

pub async fn handle_map(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let input = sub_matches.get_one::<PathBuf>("input").unwrap();
    let output = sub_matches.get_one::<PathBuf>("output");
    let format_str = sub_matches.get_one::<String>("format").unwrap();
    let no_path = sub_matches.get_flag("no-path");
    let from_embedded = sub_matches.get_flag("from-embedded");
    let endpoint = sub_matches.get_one::<Url>("endpoint");
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let skip_private = sub_matches.get_flag("skip-private");
    let dedup = sub_matches.get_flag("dedup");

    let Some(format) = ReportFormat::from_str(format_str) else {
        eprintln!("✗ Unknown format '{}'", format_str);
        std::process::exit(1);
    };

    let html = match load_document(input) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };
    debug!("Loaded {} byte(s) from {}", html.len(), input.display());

    println!("\n🌍 Mapping {}", input.display());
    if from_embedded {
        println!("Source: embedded locations\n");
    } else {
        println!("Source: hop table");
        println!(
            "Endpoint: {}\n",
            endpoint
                .map(|u| u.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
        );
    }

    let report = if from_embedded {
        embedded_route(&html)
    } else {
        let options = PipelineOptions {
            timeout_secs: timeout,
            endpoint: endpoint.map(|u| u.as_str().trim_end_matches('/').to_string()),
            skip_private,
            dedup,
            show_progress: true,
        };

        match execute_pipeline(&html, options, None).await {
            Ok(report) => report,
            Err(e) => {
                eprintln!("✗ Mapping failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    println!(
        "\n{} Plotted {} of {} hop(s)\n",
        "✓".green().bold(),
        report.resolved(),
        report.discovered
    );

    let map_options = MapOptions {
        draw_path: !no_path,
        ..MapOptions::default()
    };

    let content = match format {
        ReportFormat::Html => generate_html_report(&report, map_options),
        ReportFormat::Text => generate_text_report(&report),
        ReportFormat::Json => match generate_json_report(&report) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("✗ Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        },
    };

    write_output(&content, output);
}

pub fn handle_extract(sub_matches: &ArgMatches) {
    let input = sub_matches.get_one::<PathBuf>("input").unwrap();
    let raw = sub_matches.get_flag("raw");
    let format_str = sub_matches.get_one::<String>("format").unwrap();

    let html = match load_document(input) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    let records: Vec<HopRecord> = if raw {
        extract::scan_addresses(&html)
            .into_iter()
            .map(HopRecord::bare)
            .collect()
    } else {
        extract::extract_hops(&html)
    };

    match format_str.as_str() {
        "json" => match serde_json::to_string_pretty(&records) {
            Ok(listing) => println!("{}", listing),
            Err(e) => {
                eprintln!("✗ Failed to serialize records: {}", e);
                std::process::exit(1);
            }
        },
        _ => {
            if records.is_empty() {
                println!("No addresses found.");
                return;
            }
            for record in &records {
                if raw {
                    println!("{}", record.address);
                } else {
                    println!("{}  ({})", record.address, record.hostname);
                }
            }
        }
    }
}

pub async fn handle_resolve(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let addresses: Vec<String> = sub_matches
        .get_many::<String>("ADDRESS")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let addresses_file = sub_matches.get_one::<PathBuf>("addresses-file");
    let output = sub_matches.get_one::<PathBuf>("output");
    let format_str = sub_matches.get_one::<String>("format").unwrap();
    let endpoint = sub_matches.get_one::<Url>("endpoint");
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let skip_private = sub_matches.get_flag("skip-private");
    let dedup = sub_matches.get_flag("dedup");

    let records = match load_addresses_from_source(&addresses, addresses_file) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    println!("\n📡 Resolving {} address(es)", records.len());

    let spinner = resolve_spinner();
    let spinner_clone = spinner.clone();

    let mut resolver = Resolver::with_timeout(timeout)
        .with_skip_private(skip_private)
        .with_dedup(dedup)
        .with_progress_callback(Arc::new(move |index, address| {
            spinner_clone.set_message(format!("Resolving {}: {}", index + 1, address));
        }));

    if let Some(endpoint) = endpoint {
        resolver = resolver.with_endpoint(endpoint.as_str().trim_end_matches('/').to_string());
    }

    let locations = resolver.resolve(&records).await;
    spinner.finish_and_clear();

    println!(
        "{} Resolved {} of {} address(es)\n",
        "✓".green().bold(),
        locations.len(),
        records.len()
    );

    let report = RouteReport::new(records.len(), locations);

    let content = match ReportFormat::from_str(format_str) {
        Some(ReportFormat::Text) => generate_text_report(&report),
        Some(ReportFormat::Html) => generate_html_report(&report, MapOptions::default()),
        _ => match generate_json_report(&report) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("✗ Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        },
    };

    write_output(&content, output);
}
