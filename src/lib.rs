// Aggregation and ranking of municipal solid-waste generation.
//
// The waste table (per district, fraction and year) is joined with the
// district location table once; every view after that is a pure function
// of the resulting fact table and the caller's selection:
// - district and provincial rollups of one fraction (`aggregate`),
// - year-over-year movers between two periods (`delta`),
// - the fraction breakdown of one district-year (`composition`),
// - point intensities for a map overlay (`geo`).
pub mod aggregate;
pub mod cache;
pub mod composition;
pub mod config;
pub mod delta;
pub mod error;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod measures;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use cache::{Dataset, TableCache};
pub use error::{ReportError, Result};
pub use filter::Selection;
pub use measures::Measure;
pub use types::{FactRow, FactTable};
