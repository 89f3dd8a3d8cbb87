//! Pipeline module - loading, aggregation, merging and the statistical engines

pub mod aggregate;
pub mod analysis;
pub mod categories;
pub mod columns;
pub mod config;
pub mod correlation;
pub mod descriptive;
pub mod error;
pub mod loader;
pub mod merge;
pub mod regression;
pub mod semester;
pub mod status;
pub mod survey;

pub use aggregate::*;
pub use analysis::AnalysisRun;
pub use categories::*;
pub use config::*;
pub use correlation::*;
pub use descriptive::*;
pub use error::*;
pub use loader::*;
pub use merge::*;
pub use regression::*;
pub use semester::*;
pub use status::*;
pub use survey::*;
