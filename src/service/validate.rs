//! Pure validation for party form data. No I/O, no cache - callable
//! from any view before a create/update is submitted.

use std::collections::BTreeMap;

use crate::models::party::parse_iso_date;
use crate::models::PartyDraft;

/// Outcome of validating a `PartyDraft`. `errors` maps field name (wire
/// name, as the form knows it) to a user-facing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
}

/// Maximum digits in an international phone number (ITU E.164).
const MAX_PHONE_DIGITS: usize = 16;

/// Accepts an optional leading `+`, then 1-16 digits not starting with 0,
/// after stripping whitespace.
fn is_valid_phone(phone: &str) -> bool {
    let stripped: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = stripped.strip_prefix('+').unwrap_or(&stripped);
    if digits.is_empty() || digits.len() > MAX_PHONE_DIGITS {
        return false;
    }
    let mut chars = digits.chars();
    match chars.next() {
        Some(c) if ('1'..='9').contains(&c) => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_digit())
}

pub fn validate_party_data(data: &PartyDraft) -> Validation {
    let mut errors = BTreeMap::new();

    if data
        .party_name
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .is_empty()
    {
        errors.insert(
            "partyName".to_string(),
            "Party name is required".to_string(),
        );
    }

    if let Some(quantity) = data.quantity {
        if quantity < 0.0 {
            errors.insert(
                "quantity".to_string(),
                "Quantity must be a positive number".to_string(),
            );
        }
    }

    // Only flag the range when both dates actually parse; a malformed
    // date is the backend's problem, not a range violation.
    if let (Some(from), Some(to)) = (
        data.batch_from.as_deref().and_then(parse_iso_date),
        data.batch_to.as_deref().and_then(parse_iso_date),
    ) {
        if from > to {
            errors.insert(
                "batchTo".to_string(),
                "Batch end date must be after start date".to_string(),
            );
        }
    }

    if let Some(phone) = data.phone.as_deref() {
        if !phone.trim().is_empty() && !is_valid_phone(phone) {
            errors.insert(
                "phone".to_string(),
                "Please enter a valid phone number".to_string(),
            );
        }
    }

    Validation {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PartyDraft {
        PartyDraft {
            party_name: Some("Acme".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_name_and_negative_quantity() {
        let result = validate_party_data(&PartyDraft {
            party_name: Some("".into()),
            quantity: Some(-1.0),
            ..Default::default()
        });
        assert!(!result.is_valid);
        assert!(result.errors.contains_key("partyName"));
        assert!(result.errors.contains_key("quantity"));
    }

    #[test]
    fn test_whitespace_name_is_missing() {
        let result = validate_party_data(&PartyDraft {
            party_name: Some("   ".into()),
            ..Default::default()
        });
        assert!(result.errors.contains_key("partyName"));
    }

    #[test]
    fn test_zero_quantity_is_accepted() {
        let result = validate_party_data(&PartyDraft {
            quantity: Some(0.0),
            ..draft()
        });
        assert!(!result.errors.contains_key("quantity"));
    }

    #[test]
    fn test_batch_range_flags_end_date() {
        let result = validate_party_data(&PartyDraft {
            batch_from: Some("2024-02-01".into()),
            batch_to: Some("2024-01-01".into()),
            ..draft()
        });
        assert!(!result.is_valid);
        assert_eq!(
            result.errors.get("batchTo").map(String::as_str),
            Some("Batch end date must be after start date")
        );

        let ok = validate_party_data(&PartyDraft {
            batch_from: Some("2024-01-01".into()),
            batch_to: Some("2024-02-01".into()),
            ..draft()
        });
        assert!(ok.is_valid);
    }

    #[test]
    fn test_unparseable_batch_date_is_not_a_range_error() {
        let result = validate_party_data(&PartyDraft {
            batch_from: Some("soon".into()),
            batch_to: Some("2024-01-01".into()),
            ..draft()
        });
        assert!(result.is_valid);
    }

    #[test]
    fn test_phone_rules() {
        let valid = ["+919876543210", "4155550123", "+1 415 555 0123"];
        for phone in valid {
            let result = validate_party_data(&PartyDraft {
                phone: Some(phone.into()),
                ..draft()
            });
            assert!(result.is_valid, "expected {} to validate", phone);
        }

        let invalid = ["0123456789", "+0", "phone", "+12345678901234567"];
        for phone in invalid {
            let result = validate_party_data(&PartyDraft {
                phone: Some(phone.into()),
                ..draft()
            });
            assert!(
                result.errors.contains_key("phone"),
                "expected {} to be rejected",
                phone
            );
        }
    }

    #[test]
    fn test_empty_phone_is_not_validated() {
        let result = validate_party_data(&PartyDraft {
            phone: Some("".into()),
            ..draft()
        });
        assert!(result.is_valid);
    }
}
