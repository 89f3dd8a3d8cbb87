//! ipklens: Student Records Analysis Library
//!
//! Loads a student-records workbook, derives per-student summaries and
//! graduation status, encodes survey responses, and relates survey factors
//! to cumulative GPA with Spearman correlation and linear regression.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
