use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field name: {0}")]
    DuplicateName(String),

    #[error("Field name must not be empty")]
    EmptyName,

    #[error("Field {0} needs at least one option")]
    MissingOptions(String),

    #[error("Order values must run from 0 to {expected_max}, found {found}")]
    OrderGap { expected_max: usize, found: u32 },

    #[error("No entry at index {0}")]
    IndexOutOfRange(usize),
}

/// Every rule a submission broke, in schema order.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Validation failed: {}", .0.join("; "))]
pub struct ValidationError(pub Vec<String>);

impl ValidationError {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}
