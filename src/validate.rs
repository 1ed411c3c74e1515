//! Required-field validation.
//!
//! Runs against whatever the struct currently holds, so it works the same on
//! values populated by [`resolve`](crate::resolve) or by hand.

use crate::error::{TagfigError, ValidationError, Violation, ViolationReason};
use crate::introspect::{self, Snapshot};
use crate::types::Settings;

/// Check that every required field of `target` is non-empty.
///
/// All violations are collected, in field-name order, into one
/// [`ValidationError`].
pub fn validate<T: Settings>(target: &T) -> Result<(), TagfigError> {
    let snapshot = introspect::snapshot(target)?;
    check_required(&snapshot)?;
    Ok(())
}

pub(crate) fn check_required(snapshot: &Snapshot) -> Result<(), ValidationError> {
    let violations: Vec<Violation> = snapshot
        .schema
        .fields
        .iter()
        .filter(|field| field.required)
        .filter(|field| {
            snapshot
                .values
                .get(&field.name)
                .is_none_or(|value| value.is_empty())
        })
        .map(|field| Violation {
            field: field.name.clone(),
            reason: ViolationReason::NotSet,
        })
        .collect();

    if violations.is_empty() {
        return Ok(());
    }
    Err(ValidationError { violations })
}
