use crate::utils::error::{OrderImportError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(OrderImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(OrderImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| OrderImportError::MissingConfigError {
            field: field_name.to_string(),
        })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OrderImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 檢查字串長度（以字元計算，非位元組）
pub fn validate_max_chars(field_name: &str, value: &str, max_chars: usize) -> Result<()> {
    let count = value.chars().count();
    if count > max_chars {
        return Err(OrderImportError::constraint(format!(
            "{} has {} characters, at most {} allowed",
            field_name, count, max_chars
        )));
    }
    Ok(())
}

/// 將金額調整為 decimal(precision, scale)：先四捨五入到 scale 位，再檢查整數位數
pub fn fit_decimal(field_name: &str, value: Decimal, precision: u32, scale: u32) -> Result<Decimal> {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);

    let limit = Decimal::from(10i64.pow(precision - scale));
    if rounded.abs() >= limit {
        return Err(OrderImportError::constraint(format!(
            "{} {} does not fit decimal({}, {})",
            field_name, value, precision, scale
        )));
    }
    Ok(rounded)
}
