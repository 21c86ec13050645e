use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use roi_core::RepositoryError;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

/// Read a decimal column stored as INTEGER or REAL.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    get_optional_decimal(row, column)?
        .ok_or_else(|| RepositoryError::Database(format!("Column '{}' is NULL", column)))
}

/// Read a nullable decimal column; NULL becomes `None`.
pub fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    let type_name = value_ref.type_info().name().to_string();
    match type_name.as_str() {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get INTEGER from '{}': {}", column, e))
            })?;
            Ok(Some(Decimal::from(val)))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map(Some).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Read a non-negative count column.
pub fn get_count(
    row: &SqliteRow,
    column: &str,
) -> Result<u32, RepositoryError> {
    let val: i64 = row
        .try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", column, e)))?;
    u32::try_from(val)
        .map_err(|_| RepositoryError::Database(format!("Column '{}' out of range: {}", column, val)))
}

/// Convert a Decimal to f64 for SQLite storage.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
