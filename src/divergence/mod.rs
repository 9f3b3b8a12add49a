//! Branch divergence report.
//!
//! Ranks every branch that is ahead of the main branch by how long ago it
//! split off and how long it has been idle.

pub mod report;
pub mod table;

pub use report::{
    DEFAULT_BRANCH_FILTER, DivergenceRow, branch_filter, divergence_report, divergence_score,
    rank_rows,
};
pub use table::{describe_repository, render_table};
