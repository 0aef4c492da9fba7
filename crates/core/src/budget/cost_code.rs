//! Cost code allow-list and normalization.
//!
//! Normalization and validation are decoupled: `normalize_cost_code` returns
//! the trimmed input untouched when it is not on the list, so the validator
//! can still flag it.

/// Canonical cost codes, in template dropdown order.
pub const COST_CODES: &[&str] = &[
    "Mobilization",
    "General Conditions",
    "Demolition",
    "Clearing",
    "Erosion Control",
    "Excavation",
    "Base/Grading",
    "Utilities",
    "Drainage",
    "Concrete",
    "Asphalt",
    "Paving",
    "Striping",
    "Landscaping",
    "Traffic Control",
    "Trucking",
    "Subcontract",
];

/// Looks up the canonical spelling of a cost code.
///
/// Matching ignores case, surrounding whitespace, and runs of inner whitespace.
#[must_use]
pub fn canonical_cost_code(raw: &str) -> Option<&'static str> {
    let wanted = collapse_whitespace(raw);
    if wanted.is_empty() {
        return None;
    }
    COST_CODES
        .iter()
        .copied()
        .find(|code| code.eq_ignore_ascii_case(&wanted))
}

/// Returns the canonical cost code, or the trimmed input when it is unknown.
#[must_use]
pub fn normalize_cost_code(raw: &str) -> String {
    canonical_cost_code(raw).map_or_else(|| raw.trim().to_string(), ToString::to_string)
}

/// Returns true if the value matches an allow-listed cost code.
#[must_use]
pub fn is_valid_cost_code(raw: &str) -> bool {
    canonical_cost_code(raw).is_some()
}

/// The allow-list joined for error messages.
#[must_use]
pub fn allowed_cost_codes_display() -> String {
    COST_CODES.join(", ")
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
