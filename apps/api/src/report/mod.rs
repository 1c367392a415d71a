// PDF report: font metrics for wrapping, the lopdf renderer, and the download handler.

pub mod font_metrics;
pub mod handlers;
pub mod pdf;

pub use font_metrics::default_page_config;
