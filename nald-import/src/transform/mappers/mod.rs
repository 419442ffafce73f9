//! Entity mappers: raw NALD rows → normalized entities
//!
//! Pure, deterministic transforms. Each module maps one target entity from
//! its legacy rows; cross-row lookups come from the pre-fetched
//! [`TransformContext`](crate::transform::context::TransformContext).

pub mod agreement;
pub mod company_address;
pub mod company_contact;
pub mod document;
pub mod invoice_account;
pub mod licence;
pub mod licence_version;
pub mod party;
pub mod purpose;

/// A NALD free-text field: the literal string `null` or an empty field
/// means absent
pub(crate) fn opt_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::opt_text;

    #[test]
    fn null_sentinel_and_blanks_are_absent() {
        assert_eq!(opt_text("null"), None);
        assert_eq!(opt_text("  "), None);
        assert_eq!(opt_text("BUTTERCUP LANE"), Some("BUTTERCUP LANE".to_string()));
    }
}
