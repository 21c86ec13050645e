//! Named form fields, used to edit an [`RoiInput`] between submissions.
//!
//! An edit line is a `;`-separated list of `field=value` assignments:
//!
//! ```text
//! client_name=Klinik Sehat; admin_staff=25; staff_reduction=35%
//! ```
//!
//! Rates are entered as percentages, money as plain or comma-grouped numbers.

use std::str::FromStr;

use roi_core::RoiInput;
use thiserror::Error;

use crate::utils::{ParseDecimalError, parse_decimal, parse_percent};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("expected field=value, got '{0}'")]
    Malformed(String),

    #[error("{field}: {source}")]
    Decimal {
        field: FormField,
        #[source]
        source: ParseDecimalError,
    },

    #[error("{field}: '{value}' is not a whole number")]
    Count { field: FormField, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ConsultantName,
    ConsultantEmail,
    ConsultantPhone,
    ClientName,
    ClientLocation,
    TotalStaff,
    AdminStaff,
    MonthlyAppointments,
    InefficiencyRate,
    AvgSalary,
    RevenuePerAppointment,
    StaffReduction,
    InefficiencyReduction,
    ExchangeRate,
    SetupCostUsd,
    IntegrationCostUsd,
    TrainingCostUsd,
    MaintenanceCost,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::ConsultantName,
            FormField::ConsultantEmail,
            FormField::ConsultantPhone,
            FormField::ClientName,
            FormField::ClientLocation,
            FormField::TotalStaff,
            FormField::AdminStaff,
            FormField::MonthlyAppointments,
            FormField::InefficiencyRate,
            FormField::AvgSalary,
            FormField::RevenuePerAppointment,
            FormField::StaffReduction,
            FormField::InefficiencyReduction,
            FormField::ExchangeRate,
            FormField::SetupCostUsd,
            FormField::IntegrationCostUsd,
            FormField::TrainingCostUsd,
            FormField::MaintenanceCost,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            FormField::ConsultantName => "consultant_name",
            FormField::ConsultantEmail => "consultant_email",
            FormField::ConsultantPhone => "consultant_phone",
            FormField::ClientName => "client_name",
            FormField::ClientLocation => "client_location",
            FormField::TotalStaff => "total_staff",
            FormField::AdminStaff => "admin_staff",
            FormField::MonthlyAppointments => "monthly_appointments",
            FormField::InefficiencyRate => "inefficiency_rate",
            FormField::AvgSalary => "avg_salary",
            FormField::RevenuePerAppointment => "revenue_per_appointment",
            FormField::StaffReduction => "staff_reduction",
            FormField::InefficiencyReduction => "inefficiency_reduction",
            FormField::ExchangeRate => "exchange_rate",
            FormField::SetupCostUsd => "setup_cost_usd",
            FormField::IntegrationCostUsd => "integration_cost_usd",
            FormField::TrainingCostUsd => "training_cost_usd",
            FormField::MaintenanceCost => "maintenance_cost",
        }
    }

    /// Writes `raw` into the matching field of `input`.
    pub fn apply(
        self,
        input: &mut RoiInput,
        raw: &str,
    ) -> Result<(), FormError> {
        let text = raw.trim().to_string();
        let decimal = |value: &str| parse_decimal(value).map_err(|source| FormError::Decimal { field: self, source });
        let percent = |value: &str| parse_percent(value).map_err(|source| FormError::Decimal { field: self, source });
        let count = |value: &str| {
            value.replace(',', "").parse::<u32>().map_err(|_| FormError::Count {
                field: self,
                value: value.to_string(),
            })
        };

        match self {
            FormField::ConsultantName => input.consultant.name = text,
            FormField::ConsultantEmail => input.consultant.email = text,
            FormField::ConsultantPhone => input.consultant.phone = text,
            FormField::ClientName => input.client.name = text,
            FormField::ClientLocation => input.client.location = text,
            FormField::TotalStaff => input.total_staff = count(&text)?,
            FormField::AdminStaff => input.admin_staff = count(&text)?,
            FormField::MonthlyAppointments => input.monthly_appointments = count(&text)?,
            FormField::InefficiencyRate => input.inefficiency_rate = percent(&text)?,
            FormField::AvgSalary => input.avg_salary = decimal(&text)?,
            FormField::RevenuePerAppointment => input.revenue_per_appointment = decimal(&text)?,
            FormField::StaffReduction => input.staff_reduction_rate = percent(&text)?,
            FormField::InefficiencyReduction => input.inefficiency_reduction_rate = percent(&text)?,
            FormField::ExchangeRate => input.exchange_rate = decimal(&text)?,
            FormField::SetupCostUsd => input.setup_cost_usd = decimal(&text)?,
            FormField::IntegrationCostUsd => input.integration_cost_usd = decimal(&text)?,
            FormField::TrainingCostUsd => input.training_cost_usd = decimal(&text)?,
            FormField::MaintenanceCost => input.maintenance_cost = decimal(&text)?,
        }
        Ok(())
    }
}

impl std::fmt::Display for FormField {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FormField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        FormField::all()
            .iter()
            .copied()
            .find(|field| field.key() == key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }
}

/// Applies every assignment in `line` to a copy of `input`. Nothing is
/// changed if any assignment fails.
pub fn apply_edits(
    input: &RoiInput,
    line: &str,
) -> Result<RoiInput, FormError> {
    let mut edited = input.clone();
    for assignment in line.split(';').map(str::trim).filter(|a| !a.is_empty()) {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| FormError::Malformed(assignment.to_string()))?;
        key.parse::<FormField>()?.apply(&mut edited, value)?;
    }
    Ok(edited)
}
