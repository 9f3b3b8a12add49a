//! Changelog aggregation and rendering.

pub mod aggregate;
pub mod object;
pub mod render;

pub use aggregate::{Aggregator, changed_directories, render_change_line};
pub use object::{ChangelogEntry, ChangelogObject, EnvironmentSection};
pub use render::{ReportParams, render_report, write_report};
