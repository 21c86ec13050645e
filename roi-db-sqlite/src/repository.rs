use std::sync::LazyLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use roi_core::{PersistedReport, ReportRepository, RepositoryError};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::debug;

use crate::decimal::{decimal_to_f64, get_count, get_decimal, get_optional_decimal};

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid table name pattern"));

const COLUMNS: &str = "timestamp, consultant_name, consultant_email, consultant_phone,
    client_name, client_location, total_staff, admin_staff, monthly_appointments,
    noshow_rate_before, avg_salary, revenue_per_appointment, staff_reduction_pct,
    noshow_reduction_pct, exchange_rate, setup_cost_usd, integration_cost_usd,
    training_cost_usd, maintenance_cost_idr, total_investment, annual_savings,
    payback_period, roi_1_year, roi_5_year, pdf_link";

pub struct SqliteReportRepository {
    pool: SqlitePool,
}

impl SqliteReportRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn checked_table(table: &str) -> Result<&str, RepositoryError> {
    if TABLE_NAME.is_match(table) {
        Ok(table)
    } else {
        Err(RepositoryError::Configuration(format!("invalid table name '{}'", table)))
    }
}

fn row_to_report(row: &SqliteRow) -> Result<PersistedReport, RepositoryError> {
    let text = |column: &str| -> Result<String, RepositoryError> {
        row.try_get(column)
            .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", column, e)))
    };

    Ok(PersistedReport {
        timestamp: text("timestamp")?,
        consultant_name: text("consultant_name")?,
        consultant_email: text("consultant_email")?,
        consultant_phone: text("consultant_phone")?,
        client_name: text("client_name")?,
        client_location: text("client_location")?,
        total_staff: get_count(row, "total_staff")?,
        admin_staff: get_count(row, "admin_staff")?,
        monthly_appointments: get_count(row, "monthly_appointments")?,
        noshow_rate_before: get_decimal(row, "noshow_rate_before")?,
        avg_salary: get_decimal(row, "avg_salary")?,
        revenue_per_appointment: get_decimal(row, "revenue_per_appointment")?,
        staff_reduction_pct: get_decimal(row, "staff_reduction_pct")?,
        noshow_reduction_pct: get_decimal(row, "noshow_reduction_pct")?,
        exchange_rate: get_decimal(row, "exchange_rate")?,
        setup_cost_usd: get_decimal(row, "setup_cost_usd")?,
        integration_cost_usd: get_decimal(row, "integration_cost_usd")?,
        training_cost_usd: get_decimal(row, "training_cost_usd")?,
        maintenance_cost_idr: get_decimal(row, "maintenance_cost_idr")?,
        total_investment: get_decimal(row, "total_investment")?,
        annual_savings: get_decimal(row, "annual_savings")?,
        payback_period: get_optional_decimal(row, "payback_period")?,
        roi_1_year: get_optional_decimal(row, "roi_1_year")?,
        roi_5_year: get_optional_decimal(row, "roi_5_year")?,
        pdf_link: row
            .try_get("pdf_link")
            .map_err(|e| RepositoryError::Database(format!("Failed to get 'pdf_link': {}", e)))?,
    })
}

#[async_trait]
impl ReportRepository for SqliteReportRepository {
    async fn insert_report(
        &self,
        table: &str,
        report: &PersistedReport,
    ) -> Result<(), RepositoryError> {
        let table = checked_table(table)?;
        let sql = format!(
            "INSERT INTO {table} ({COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );

        let result = sqlx::query(&sql)
            .bind(&report.timestamp)
            .bind(&report.consultant_name)
            .bind(&report.consultant_email)
            .bind(&report.consultant_phone)
            .bind(&report.client_name)
            .bind(&report.client_location)
            .bind(report.total_staff)
            .bind(report.admin_staff)
            .bind(report.monthly_appointments)
            .bind(decimal_to_f64(report.noshow_rate_before))
            .bind(decimal_to_f64(report.avg_salary))
            .bind(decimal_to_f64(report.revenue_per_appointment))
            .bind(decimal_to_f64(report.staff_reduction_pct))
            .bind(decimal_to_f64(report.noshow_reduction_pct))
            .bind(decimal_to_f64(report.exchange_rate))
            .bind(decimal_to_f64(report.setup_cost_usd))
            .bind(decimal_to_f64(report.integration_cost_usd))
            .bind(decimal_to_f64(report.training_cost_usd))
            .bind(decimal_to_f64(report.maintenance_cost_idr))
            .bind(decimal_to_f64(report.total_investment))
            .bind(decimal_to_f64(report.annual_savings))
            .bind(report.payback_period.map(decimal_to_f64))
            .bind(report.roi_1_year.map(decimal_to_f64))
            .bind(report.roi_5_year.map(decimal_to_f64))
            .bind(&report.pdf_link)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(table, id = result.last_insert_rowid(), "report row inserted");
        Ok(())
    }

    async fn list_reports(
        &self,
        table: &str,
        limit: u32,
    ) -> Result<Vec<PersistedReport>, RepositoryError> {
        let table = checked_table(table)?;
        let sql = format!("SELECT {COLUMNS} FROM {table} ORDER BY id DESC LIMIT ?");

        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_report).collect()
    }
}
