//! Output module: progress reporting and result presentation
//!
//! The scrape pipeline has no opinion on rendering; it emits progress events
//! through a sink trait and hands the final report to a presenter chosen by
//! the caller.

mod formatters;
mod presenter;
mod progress;

pub use formatters::format_stars;
pub use presenter::{display_project_info, display_report, OutputFormat};
pub use progress::{BarProgress, NoopProgress, ProgressSink};
