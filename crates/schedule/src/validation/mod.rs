//! Schedule item validation with structured errors and suggestions.
//!
//! Validates administrator-authored items: identity fields, the recurrence
//! descriptor, and combinations that parse fine but will surprise whoever
//! wrote them. Returns a [`ValidationResult`] with errors (block save) and
//! warnings (advisory).

mod item_checks;
mod recurrence_checks;

pub(crate) mod fuzzy;

use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceKind;
use crate::schema::{ItemKind, ScheduledItem};

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Dotted location, e.g. `"recurrence.day_of_month"`.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// All error messages joined for a one-line log or error value.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| {
                if e.path.is_empty() {
                    e.message.clone()
                } else {
                    format!("{}: {}", e.path, e.message)
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`ScheduledItem`].
pub fn validate_item(item: &ScheduledItem) -> ValidationResult {
    let mut result = ValidationResult::new();
    item_checks::validate_identity(item, &mut result);
    recurrence_checks::validate_recurrence(item, &mut result);
    result
}

/// Parse raw YAML and validate.
///
/// Misspelled `kind` values get a suggestion before the typed parse is
/// attempted, since serde would only report the unknown variant.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    let value: serde_yaml::Value = match serde_yaml::from_str(yaml) {
        Ok(v) => v,
        Err(e) => {
            result.error("", format!("YAML parse error: {e}"));
            return result;
        }
    };

    check_enum_field(&value["kind"], "kind", ItemKind::NAMES, &mut result);
    check_enum_field(
        &value["recurrence"]["kind"],
        "recurrence.kind",
        RecurrenceKind::NAMES,
        &mut result,
    );
    if !result.valid {
        return result;
    }

    match serde_yaml::from_value::<ScheduledItem>(value) {
        Ok(item) => {
            let checked = validate_item(&item);
            result.errors.extend(checked.errors);
            result.warnings.extend(checked.warnings);
            result.valid = result.errors.is_empty();
        }
        Err(e) => result.error("", format!("invalid item: {e}")),
    }
    result
}

fn check_enum_field(
    value: &serde_yaml::Value,
    path: &str,
    names: &[&str],
    result: &mut ValidationResult,
) {
    let Some(s) = value.as_str() else {
        return;
    };
    if names.contains(&s) {
        return;
    }
    let message = format!("Unknown value '{s}', expected one of: {}", names.join(", "));
    match fuzzy::fuzzy_match(s, names) {
        Some(hint) => result.error_with_suggestion(path, message, format!("Did you mean '{hint}'?")),
        None => result.error(path, message),
    }
}
