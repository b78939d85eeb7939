//! `${VAR}` expansion for config strings.

use std::borrow::Cow;
use std::env::VarError;

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` in `value`.
///
/// `field` names the config key in the error when a variable is unset.
/// Strings without `${` are returned as-is, so a bare `$` survives.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env_with_context(value, lookup)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

fn lookup(var: &str) -> Result<Option<String>, VarError> {
    std::env::var(var).map(Some)
}
