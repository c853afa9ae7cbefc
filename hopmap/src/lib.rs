// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    load_addresses_from_file,
    load_addresses_from_source,
    load_document,
    parse_address_line,
};

// Re-export pipeline and report functionality from hopmap-core
pub use hopmap_core::pipeline::{
    PipelineOptions, embedded_route, execute_pipeline,
};
pub use hopmap_core::report::{
    ReportFormat, RouteReport, generate_html_report, generate_json_report, generate_text_report,
};
