use bigdecimal::BigDecimal;
use std::fmt;

pub const PRODUCT_NAME_MAX_LEN: usize = 255;
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn sanitize_string(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

/// Sanitizes a product name and checks it. Returns the cleaned name.
pub fn validate_product_name(name: &str) -> Result<String, ValidationError> {
    let name = sanitize_string(name);
    validate_required("name", &name)?;
    validate_max_len("name", &name, PRODUCT_NAME_MAX_LEN)?;
    Ok(name)
}

pub fn validate_non_negative_price(price: &BigDecimal) -> ValidationResult {
    if price < &BigDecimal::from(0) {
        return Err(ValidationError::new("price", "must not be negative"));
    }

    Ok(())
}

pub fn validate_non_negative(field: &'static str, value: i64) -> ValidationResult {
    if value < 0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }

    Ok(())
}

pub fn validate_positive_quantity(quantity: i32) -> ValidationResult {
    if quantity <= 0 {
        return Err(ValidationError::new("quantity", "must be greater than zero"));
    }

    Ok(())
}

/// Resolves optional `skip`/`limit` query values to a checked (offset, limit).
pub fn validate_page(skip: Option<i64>, limit: Option<i64>) -> Result<(i64, i64), ValidationError> {
    let offset = skip.unwrap_or(0);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    validate_non_negative("skip", offset)?;
    validate_non_negative("limit", limit)?;
    Ok((offset, limit))
}
