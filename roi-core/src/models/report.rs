use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::calculations::common::fraction_to_percent;
use crate::models::{Metric, PersistedReport, RoiInput};
use crate::time::format_timestamp;

/// One calculation: the submitted inputs plus every derived figure.
///
/// Built by [`crate::calculations::ReportBuilder`] and never edited in
/// place. Attaching the uploaded PDF address produces a new record via
/// [`ReportRecord::with_pdf_link`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub input: RoiInput,

    // Investment breakdown (local currency)
    pub setup_cost: Decimal,
    pub integration_cost: Decimal,
    pub training_cost: Decimal,
    pub total_investment: Decimal,

    // Monthly savings breakdown
    pub staff_savings_monthly: Decimal,
    pub noshow_savings_monthly: Decimal,
    pub total_monthly_savings: Decimal,
    pub annual_savings: Decimal,

    // Headline metrics
    pub payback_period: Metric,
    pub roi_1_year: Metric,
    pub roi_5_year: Metric,

    pub pdf_link: Option<String>,
}

impl ReportRecord {
    /// `2025-01-31 14:05:09 WIB`
    pub fn timestamp_label(&self) -> String {
        format_timestamp(&self.timestamp)
    }

    pub fn with_pdf_link(
        &self,
        link: impl Into<String>,
    ) -> Self {
        Self {
            pdf_link: Some(link.into()),
            ..self.clone()
        }
    }

    /// The row written to the reports table.
    ///
    /// Intermediate breakdowns (`setup_cost`, `integration_cost`,
    /// `training_cost`, `staff_savings_monthly`, `noshow_savings_monthly`,
    /// `total_monthly_savings`) are not persisted, and undefined metrics
    /// become `None`.
    pub fn to_persisted(&self) -> PersistedReport {
        let input = &self.input;
        PersistedReport {
            timestamp: self.timestamp_label(),
            consultant_name: input.consultant.name.clone(),
            consultant_email: input.consultant.email.clone(),
            consultant_phone: input.consultant.phone.clone(),
            client_name: input.client.name.clone(),
            client_location: input.client.location.clone(),
            total_staff: input.total_staff,
            admin_staff: input.admin_staff,
            monthly_appointments: input.monthly_appointments,
            noshow_rate_before: fraction_to_percent(input.inefficiency_rate),
            avg_salary: input.avg_salary,
            revenue_per_appointment: input.revenue_per_appointment,
            staff_reduction_pct: fraction_to_percent(input.staff_reduction_rate),
            noshow_reduction_pct: fraction_to_percent(input.inefficiency_reduction_rate),
            exchange_rate: input.exchange_rate,
            setup_cost_usd: input.setup_cost_usd,
            integration_cost_usd: input.integration_cost_usd,
            training_cost_usd: input.training_cost_usd,
            maintenance_cost_idr: input.maintenance_cost,
            total_investment: self.total_investment,
            annual_savings: self.annual_savings,
            payback_period: self.payback_period.as_option(),
            roi_1_year: self.roi_1_year.as_option(),
            roi_5_year: self.roi_5_year.as_option(),
            pdf_link: self.pdf_link.clone(),
        }
    }
}
