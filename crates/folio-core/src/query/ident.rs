use crate::errors::{FolioError, Result};

/// Accept only `[A-Za-z_][A-Za-z0-9_]*`
///
/// Table names, aliases, columns and parameter names are interpolated into
/// SQL text, so anything else is rejected.
///
/// # Errors
///
/// `InvalidIdentifier` when `name` is empty or contains other characters.
pub fn validate_identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(name)
    } else {
        Err(FolioError::InvalidIdentifier {
            name: name.to_string(),
        }
        .into())
    }
}
