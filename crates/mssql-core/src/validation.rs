// SPDX-License-Identifier: Apache-2.0

//! Request validation helpers.
//!
//! Identifiers (database, table, column names and column types) are
//! interpolated into generated SQL without quoting, so every identifier is
//! screened for statement separators, comment markers, quote characters and
//! comparison operators before generation. Bracketed (`[Order Details]`) and dotted
//! (`dbo.Person`) names remain legal.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{EngineError, EngineResult};

static FORBIDDEN_IDENTIFIER_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(;|--|/\*|\*/|'|"|\x00|=|<|>|!)"#).expect("identifier pattern is valid")
});

/// Implemented by every request payload; runs before any SQL is generated.
pub trait Validate {
    fn validate(&self) -> EngineResult<()>;
}

/// Fails with "`field`: must not be blank" for empty or whitespace-only values.
pub fn require_non_blank(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::blank_field(field));
    }
    Ok(())
}

/// Non-blank plus free of tokens that would end or comment out the statement.
pub fn require_identifier(field: &str, value: &str) -> EngineResult<()> {
    require_non_blank(field, value)?;
    if let Some(found) = FORBIDDEN_IDENTIFIER_TOKENS.find(value) {
        return Err(EngineError::validation(format!(
            "{field}: '{value}' contains forbidden token '{}'",
            found.as_str().escape_default()
        )));
    }
    Ok(())
}

/// Applies [`require_identifier`] to each entry, naming the offending index.
pub fn require_identifiers<'a>(
    field: &str,
    values: impl IntoIterator<Item = &'a String>,
) -> EngineResult<()> {
    for (idx, value) in values.into_iter().enumerate() {
        require_identifier(&format!("{field}[{idx}]"), value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(require_non_blank("tableName", "").is_err());
        assert!(require_non_blank("tableName", "   ").is_err());
        assert!(require_non_blank("tableName", "Person").is_ok());
    }

    #[test]
    fn plain_bracketed_and_dotted_identifiers_pass() {
        for ident in ["Person", "dbo.Person", "[Order Details]", "DECIMAL(10,2)", "first_name"] {
            assert!(require_identifier("x", ident).is_ok(), "{ident} should pass");
        }
    }

    #[test]
    fn injection_tokens_are_rejected() {
        for ident in ["Person; DROP TABLE x", "Person--", "a/*b*/", "O'Brien", "\"x\""] {
            let err = require_identifier("tableName", ident).unwrap_err();
            assert!(err.to_string().contains("tableName"), "{err}");
        }
    }

    #[test]
    fn predicate_shaped_names_are_rejected() {
        for ident in ["1=1 OR Name", "Age>0 OR Age", "a<>b", "x!y"] {
            let err = require_identifier("filters[0]", ident).unwrap_err();
            assert!(err.is_validation(), "{ident} should be rejected");
        }
    }

    #[test]
    fn list_errors_name_the_index() {
        let cols = vec!["Name".to_string(), "Age;".to_string()];
        let err = require_identifiers("columnNames", &cols).unwrap_err();
        assert!(err.to_string().contains("columnNames[1]"));
    }
}
