//! Inbound operator accessor for CLI handlers.

use std::sync::OnceLock;

use crate::error::{ConfigError, Result};
use crate::port::inbound::RegimeOperator;

static OPERATOR: OnceLock<Box<dyn RegimeOperator>> = OnceLock::new();

/// Installs the operator implementation used by CLI handlers.
pub fn install(
    operator: Box<dyn RegimeOperator>,
) -> std::result::Result<(), Box<dyn RegimeOperator>> {
    OPERATOR.set(operator)
}

/// Returns the configured operator capability surface for CLI handlers.
pub fn operator() -> Result<&'static dyn RegimeOperator> {
    OPERATOR
        .get()
        .map(|boxed| boxed.as_ref())
        .ok_or_else(|| ConfigError::Other("CLI operator not installed".into()).into())
}
