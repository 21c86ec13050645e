//! Derives a [`ReportRecord`] from submitted parameters.
//!
//! # Derivation
//!
//! | Field | Formula |
//! |-------|---------|
//! | setup / integration / training cost | USD amount × exchange rate |
//! | total investment | setup + integration + training |
//! | staff savings (monthly) | admin staff × average salary × staff reduction rate |
//! | inefficiency savings (monthly) | transactions × inefficiency rate × inefficiency reduction rate × revenue per transaction |
//! | net monthly savings | staff savings + inefficiency savings − maintenance |
//! | annual savings | net monthly savings × 12 |
//! | payback period (months) | total investment ÷ net monthly savings, undefined when savings ≤ 0 |
//! | 1-year / 5-year ROI | see [`calculate_roi`] |
//!
//! # Example
//!
//! ```
//! use chrono::TimeZone;
//! use rust_decimal_macros::dec;
//! use roi_core::RoiInput;
//! use roi_core::calculations::ReportBuilder;
//! use roi_core::time::wib;
//!
//! let input = RoiInput::default();
//! let timestamp = wib().with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
//!
//! let report = ReportBuilder::new(&input).build(timestamp).unwrap();
//!
//! assert_eq!(report.total_investment, dec!(720000000));
//! assert_eq!(report.total_monthly_savings, dec!(118000000));
//! assert_eq!(report.annual_savings, dec!(1416000000));
//! ```

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::MONTHS_PER_YEAR;
use crate::calculations::roi::calculate_roi;
use crate::models::{Metric, ReportRecord, RoiInput};
use crate::time::now_wib;

/// Errors that can occur while deriving a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportBuilderError {
    /// An intermediate amount does not fit in a decimal.
    #[error("{0} is too large to calculate")]
    Overflow(&'static str),
}

/// Calculator for one report.
#[derive(Debug, Clone)]
pub struct ReportBuilder<'a> {
    input: &'a RoiInput,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(input: &'a RoiInput) -> Self {
        Self { input }
    }

    /// Builds the report stamped with the current WIB time.
    pub fn build_now(&self) -> Result<ReportRecord, ReportBuilderError> {
        self.build(now_wib())
    }

    /// Builds the report stamped with `timestamp`.
    ///
    /// Every numeric field depends only on the input, so two builds of the
    /// same input differ at most in their timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`ReportBuilderError::Overflow`] if an amount exceeds the
    /// decimal range.
    pub fn build(
        &self,
        timestamp: DateTime<FixedOffset>,
    ) -> Result<ReportRecord, ReportBuilderError> {
        let input = self.input;

        let setup_cost = self.to_local("setup_cost", input.setup_cost_usd)?;
        let integration_cost = self.to_local("integration_cost", input.integration_cost_usd)?;
        let training_cost = self.to_local("training_cost", input.training_cost_usd)?;
        let total_investment = sum("total_investment", &[setup_cost, integration_cost, training_cost])?;

        let staff_savings_monthly = self.staff_savings_monthly()?;
        let noshow_savings_monthly = self.noshow_savings_monthly()?;
        let total_monthly_savings =
            self.total_monthly_savings(staff_savings_monthly, noshow_savings_monthly)?;
        let annual_savings = total_monthly_savings
            .checked_mul(MONTHS_PER_YEAR)
            .ok_or(ReportBuilderError::Overflow("annual_savings"))?;

        let payback_period = self.payback_period(total_investment, total_monthly_savings);
        let roi_1_year = calculate_roi(total_investment, annual_savings, 1);
        let roi_5_year = calculate_roi(total_investment, annual_savings, 5);

        debug!(
            %total_investment,
            %total_monthly_savings,
            payback = %payback_period.display_number(),
            "report derived"
        );

        Ok(ReportRecord {
            timestamp,
            input: input.clone(),
            setup_cost,
            integration_cost,
            training_cost,
            total_investment,
            staff_savings_monthly,
            noshow_savings_monthly,
            total_monthly_savings,
            annual_savings,
            payback_period,
            roi_1_year,
            roi_5_year,
            pdf_link: None,
        })
    }

    /// Converts a USD cost component into local currency.
    fn to_local(
        &self,
        field: &'static str,
        usd: Decimal,
    ) -> Result<Decimal, ReportBuilderError> {
        usd.checked_mul(self.input.exchange_rate)
            .ok_or(ReportBuilderError::Overflow(field))
    }

    /// Salary cost removed by lightening admin workload.
    fn staff_savings_monthly(&self) -> Result<Decimal, ReportBuilderError> {
        product(
            "staff_savings_monthly",
            &[
                Decimal::from(self.input.admin_staff),
                self.input.avg_salary,
                self.input.staff_reduction_rate,
            ],
        )
    }

    /// Revenue recovered from transactions that are no longer lost.
    fn noshow_savings_monthly(&self) -> Result<Decimal, ReportBuilderError> {
        product(
            "noshow_savings_monthly",
            &[
                Decimal::from(self.input.monthly_appointments),
                self.input.inefficiency_rate,
                self.input.inefficiency_reduction_rate,
                self.input.revenue_per_appointment,
            ],
        )
    }

    /// Gross monthly savings less recurring maintenance.
    fn total_monthly_savings(
        &self,
        staff_savings: Decimal,
        noshow_savings: Decimal,
    ) -> Result<Decimal, ReportBuilderError> {
        staff_savings
            .checked_add(noshow_savings)
            .and_then(|gross| gross.checked_sub(self.input.maintenance_cost))
            .ok_or(ReportBuilderError::Overflow("total_monthly_savings"))
    }

    /// Months until cumulative savings cover the investment.
    fn payback_period(
        &self,
        total_investment: Decimal,
        total_monthly_savings: Decimal,
    ) -> Metric {
        if total_monthly_savings <= Decimal::ZERO {
            return Metric::Undefined;
        }
        Metric::from_option(total_investment.checked_div(total_monthly_savings))
    }
}

fn product(
    field: &'static str,
    factors: &[Decimal],
) -> Result<Decimal, ReportBuilderError> {
    factors
        .iter()
        .try_fold(Decimal::ONE, |acc, factor| acc.checked_mul(*factor))
        .ok_or(ReportBuilderError::Overflow(field))
}

fn sum(
    field: &'static str,
    terms: &[Decimal],
) -> Result<Decimal, ReportBuilderError> {
    terms
        .iter()
        .try_fold(Decimal::ZERO, |acc, term| acc.checked_add(*term))
        .ok_or(ReportBuilderError::Overflow(field))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;
    use crate::time::wib;

    /// Routes builder logs to the test output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn timestamp() -> DateTime<FixedOffset> {
        wib().with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap()
    }

    fn build(input: &RoiInput) -> ReportRecord {
        ReportBuilder::new(input).build(timestamp()).unwrap()
    }

    // =========================================================================
    // investment
    // =========================================================================

    #[test]
    fn cost_components_are_converted_at_exchange_rate() {
        let report = build(&RoiInput::default());

        assert_eq!(report.setup_cost, dec!(320000000));
        assert_eq!(report.integration_cost, dec!(240000000));
        assert_eq!(report.training_cost, dec!(160000000));
    }

    #[test]
    fn total_investment_is_sum_of_components() {
        let input = RoiInput {
            exchange_rate: dec!(15500),
            setup_cost_usd: dec!(1234),
            integration_cost_usd: dec!(0),
            training_cost_usd: dec!(99.5),
            ..RoiInput::default()
        };

        let report = build(&input);

        assert_eq!(report.setup_cost, dec!(1234) * dec!(15500));
        assert_eq!(report.training_cost, dec!(99.5) * dec!(15500));
        assert_eq!(
            report.total_investment,
            report.setup_cost + report.integration_cost + report.training_cost
        );
    }

    // =========================================================================
    // savings
    // =========================================================================

    #[test]
    fn staff_savings_scenario() {
        let input = RoiInput {
            admin_staff: 20,
            avg_salary: dec!(8000000),
            staff_reduction_rate: dec!(0.30),
            ..RoiInput::default()
        };

        assert_eq!(build(&input).staff_savings_monthly, dec!(48000000));
    }

    #[test]
    fn noshow_savings_scenario() {
        let input = RoiInput {
            monthly_appointments: 5000,
            inefficiency_rate: dec!(0.15),
            inefficiency_reduction_rate: dec!(0.40),
            revenue_per_appointment: dec!(250000),
            ..RoiInput::default()
        };

        assert_eq!(build(&input).noshow_savings_monthly, dec!(75000000));
    }

    #[test]
    fn zero_inefficiency_reduction_yields_no_noshow_savings() {
        let input = RoiInput {
            inefficiency_rate: dec!(0.5),
            inefficiency_reduction_rate: dec!(0),
            revenue_per_appointment: dec!(999999),
            ..RoiInput::default()
        };

        assert_eq!(build(&input).noshow_savings_monthly, Decimal::ZERO);
    }

    #[test]
    fn zero_transaction_volume_yields_no_noshow_savings() {
        let input = RoiInput {
            monthly_appointments: 0,
            ..RoiInput::default()
        };

        let report = build(&input);

        assert_eq!(report.noshow_savings_monthly, Decimal::ZERO);
        assert_eq!(report.total_monthly_savings, dec!(43000000));
    }

    #[test]
    fn net_and_annual_savings_identities() {
        let report = build(&RoiInput::default());

        assert_eq!(
            report.total_monthly_savings,
            report.staff_savings_monthly + report.noshow_savings_monthly - dec!(5000000)
        );
        assert_eq!(report.annual_savings, report.total_monthly_savings * dec!(12));
    }

    // =========================================================================
    // headline metrics
    // =========================================================================

    #[test]
    fn default_scenario_metrics() {
        let report = build(&RoiInput::default());

        assert_eq!(report.payback_period.display_number(), "6.1");
        assert_eq!(report.roi_1_year.display_percent(), "96.7%");
        assert_eq!(report.roi_5_year.display_percent(), "883.3%");
    }

    #[test]
    fn payback_is_undefined_without_positive_savings() {
        let _guard = init_test_tracing();
        let input = RoiInput {
            admin_staff: 0,
            monthly_appointments: 0,
            maintenance_cost: dec!(1000000),
            ..RoiInput::default()
        };

        let report = build(&input);

        assert!(report.total_monthly_savings < Decimal::ZERO);
        assert_eq!(report.payback_period, Metric::Undefined);
    }

    #[test]
    fn payback_is_undefined_at_exactly_zero_savings() {
        let input = RoiInput {
            admin_staff: 0,
            monthly_appointments: 0,
            maintenance_cost: dec!(0),
            ..RoiInput::default()
        };

        let report = build(&input);

        assert_eq!(report.total_monthly_savings, Decimal::ZERO);
        assert_eq!(report.payback_period, Metric::Undefined);
    }

    #[test]
    fn zero_investment_makes_roi_undefined() {
        let input = RoiInput {
            setup_cost_usd: dec!(0),
            integration_cost_usd: dec!(0),
            training_cost_usd: dec!(0),
            ..RoiInput::default()
        };

        let report = build(&input);

        assert_eq!(report.total_investment, Decimal::ZERO);
        assert_eq!(report.roi_1_year, Metric::Undefined);
        assert_eq!(report.roi_5_year, Metric::Undefined);
        assert_eq!(report.payback_period, Metric::Finite(Decimal::ZERO));
    }

    #[test]
    fn building_twice_gives_identical_figures() {
        let input = RoiInput::default();
        let builder = ReportBuilder::new(&input);

        let first = builder.build(timestamp()).unwrap();
        let second = builder.build_now().unwrap();

        assert_eq!(first.total_investment, second.total_investment);
        assert_eq!(first.total_monthly_savings, second.total_monthly_savings);
        assert_eq!(first.payback_period, second.payback_period);
        assert_eq!(first.roi_5_year, second.roi_5_year);
        assert_eq!(first, ReportRecord { timestamp: first.timestamp, ..second });
    }

    #[test]
    fn overflow_is_reported_not_panicked() {
        let _guard = init_test_tracing();
        let input = RoiInput {
            exchange_rate: Decimal::MAX,
            setup_cost_usd: dec!(10),
            ..RoiInput::default()
        };

        assert_eq!(
            ReportBuilder::new(&input).build(timestamp()),
            Err(ReportBuilderError::Overflow("setup_cost"))
        );
    }

    // =========================================================================
    // persistence shape
    // =========================================================================

    #[test]
    fn persisted_row_nulls_undefined_metrics() {
        let input = RoiInput {
            setup_cost_usd: dec!(0),
            integration_cost_usd: dec!(0),
            training_cost_usd: dec!(0),
            admin_staff: 0,
            monthly_appointments: 0,
            ..RoiInput::default()
        };

        let row = build(&input).to_persisted();

        assert_eq!(row.payback_period, None);
        assert_eq!(row.roi_1_year, None);
        assert_eq!(row.roi_5_year, None);
    }

    #[test]
    fn persisted_row_omits_breakdowns_and_uses_percentages() {
        let report = build(&RoiInput::default()).with_pdf_link("https://example.test/r.pdf");

        let json = serde_json::to_value(report.to_persisted()).unwrap();
        let object = json.as_object().unwrap();

        for stripped in [
            "setup_cost",
            "integration_cost",
            "training_cost",
            "total_monthly_savings",
            "staff_savings_monthly",
            "noshow_savings_monthly",
        ] {
            assert!(!object.contains_key(stripped), "{stripped} should be stripped");
        }
        assert_eq!(object["noshow_rate_before"], serde_json::json!(15.0));
        assert_eq!(object["staff_reduction_pct"], serde_json::json!(30.0));
        assert_eq!(object["total_investment"], serde_json::json!(720000000.0));
        assert_eq!(object["timestamp"], serde_json::json!("2025-01-31 10:00:00 WIB"));
        assert_eq!(object["pdf_link"], serde_json::json!("https://example.test/r.pdf"));
    }
}
