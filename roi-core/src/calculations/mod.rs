//! ROI calculation modules.
//!
//! This module provides the return-on-investment formula and the builder
//! that derives a complete report from the submitted parameters.

pub mod common;
pub mod report_builder;
pub mod roi;

pub use report_builder::{ReportBuilder, ReportBuilderError};
pub use roi::calculate_roi;
