// Report layout: static Helvetica metrics, line breaking and pagination.
// Pure CPU work; handlers run it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod paginate;

pub use font_metrics::{default_page_config, PageConfig};
pub use paginate::paginate;
