use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The sanitized report row, one per submission.
///
/// Field names are the column names of the reports table. Decimals are
/// written as JSON numbers and undefined metrics as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedReport {
    pub timestamp: String,
    pub consultant_name: String,
    pub consultant_email: String,
    pub consultant_phone: String,
    pub client_name: String,
    pub client_location: String,
    pub total_staff: u32,
    pub admin_staff: u32,
    pub monthly_appointments: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub noshow_rate_before: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg_salary: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue_per_appointment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub staff_reduction_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub noshow_reduction_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub exchange_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub setup_cost_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub integration_cost_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub training_cost_usd: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub maintenance_cost_idr: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_investment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub annual_savings: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub payback_period: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub roi_1_year: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub roi_5_year: Option<Decimal>,
    pub pdf_link: Option<String>,
}
