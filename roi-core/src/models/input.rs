use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that block a submission before anything is calculated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// One or more consultant identity fields are blank.
    #[error("missing consultant information: {}", .0.join(", "))]
    MissingConsultantInfo(Vec<&'static str>),

    /// A rate parameter is not a fraction in [0, 1].
    #[error("{field} must be between 0 and 1, got {value}")]
    RateOutOfRange { field: &'static str, value: Decimal },

    /// A monetary parameter is negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
}

/// The person preparing the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultantInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ConsultantInfo {
    /// Names of the identity fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// The "compute and save" action is only available once this holds.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// The client or project the analysis is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub location: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: "Project Alpha".to_string(),
            location: "Jakarta".to_string(),
        }
    }
}

/// Everything the user supplies for one calculation.
///
/// Rates are fractions (`0.15` for 15%). USD amounts are converted with
/// `exchange_rate`; `maintenance_cost` is already in local currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiInput {
    pub consultant: ConsultantInfo,
    pub client: ClientInfo,

    // Operational parameters
    pub total_staff: u32,
    pub admin_staff: u32,
    pub monthly_appointments: u32,
    pub inefficiency_rate: Decimal,

    // Cost parameters (local currency)
    pub avg_salary: Decimal,
    pub revenue_per_appointment: Decimal,

    // Expected efficiency gains
    pub staff_reduction_rate: Decimal,
    pub inefficiency_reduction_rate: Decimal,

    // Implementation costs
    pub exchange_rate: Decimal,
    pub setup_cost_usd: Decimal,
    pub integration_cost_usd: Decimal,
    pub training_cost_usd: Decimal,
    pub maintenance_cost: Decimal,
}

impl Default for RoiInput {
    fn default() -> Self {
        Self {
            consultant: ConsultantInfo::default(),
            client: ClientInfo::default(),
            total_staff: 200,
            admin_staff: 20,
            monthly_appointments: 5000,
            inefficiency_rate: Decimal::new(15, 2),
            avg_salary: Decimal::from(8_000_000),
            revenue_per_appointment: Decimal::from(250_000),
            staff_reduction_rate: Decimal::new(30, 2),
            inefficiency_reduction_rate: Decimal::new(40, 2),
            exchange_rate: Decimal::from(16_000),
            setup_cost_usd: Decimal::from(20_000),
            integration_cost_usd: Decimal::from(15_000),
            training_cost_usd: Decimal::from(10_000),
            maintenance_cost: Decimal::from(5_000_000),
        }
    }
}

impl RoiInput {
    /// Checks the submission before calculation.
    ///
    /// # Errors
    ///
    /// Returns the first [`InputError`] found, checking consultant identity
    /// first, then rates, then monetary amounts.
    pub fn validate(&self) -> Result<(), InputError> {
        let missing = self.consultant.missing_fields();
        if !missing.is_empty() {
            return Err(InputError::MissingConsultantInfo(missing));
        }

        for (field, value) in [
            ("inefficiency_rate", self.inefficiency_rate),
            ("staff_reduction_rate", self.staff_reduction_rate),
            ("inefficiency_reduction_rate", self.inefficiency_reduction_rate),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(InputError::RateOutOfRange { field, value });
            }
        }

        for (field, value) in [
            ("avg_salary", self.avg_salary),
            ("revenue_per_appointment", self.revenue_per_appointment),
            ("exchange_rate", self.exchange_rate),
            ("setup_cost_usd", self.setup_cost_usd),
            ("integration_cost_usd", self.integration_cost_usd),
            ("training_cost_usd", self.training_cost_usd),
            ("maintenance_cost", self.maintenance_cost),
        ] {
            if value < Decimal::ZERO {
                return Err(InputError::NegativeAmount { field, value });
            }
        }

        Ok(())
    }
}
