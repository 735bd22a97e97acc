//! Input validation for new tickets.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{StoreError, TicketDetails};

/// Country codes accepted in front of a 10-digit number when none are
/// configured.
pub const DEFAULT_COUNTRY_CODES: &[&str] = &["+91"];

/// Ten digits, no leading zero.
static LOCAL_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[1-9][0-9]{9}$").unwrap());

/// Fails with [`StoreError::Validation`] naming every required field that is
/// empty after trimming.
pub fn check_required(details: &TicketDetails) -> Result<(), StoreError> {
    let required = [
        ("product", &details.product),
        ("issue", &details.issue),
        ("pickupDate", &details.pickup_date),
        ("timeSlot", &details.time_slot),
        ("address", &details.address),
        ("contactNumber", &details.contact_number),
    ];

    let missing: Vec<String> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation { fields: missing })
    }
}

/// Phone-number shape check.
///
/// Whitespace is ignored. A number is accepted if it is ten digits not
/// starting with 0, optionally preceded by one of the configured country
/// codes.
#[derive(Debug, Clone)]
pub struct ContactValidator {
    country_codes: Vec<String>,
}

impl ContactValidator {
    pub fn new<I, S>(country_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut country_codes: Vec<String> = country_codes.into_iter().map(Into::into).collect();
        // Longest first so "+91" is not shadowed by a shorter "+9".
        country_codes.sort_by_key(|code| std::cmp::Reverse(code.len()));

        Self { country_codes }
    }

    /// Returns true if `contact` has an accepted shape.
    pub fn is_valid(&self, contact: &str) -> bool {
        let compact: String = contact.chars().filter(|c| !c.is_whitespace()).collect();
        let local = self
            .country_codes
            .iter()
            .find_map(|code| compact.strip_prefix(code.as_str()))
            .unwrap_or(compact.as_str());
        LOCAL_NUMBER.is_match(local)
    }

    /// Fails with [`StoreError::InvalidContact`] for malformed numbers.
    pub fn check(&self, contact: &str) -> Result<(), StoreError> {
        if self.is_valid(contact) {
            Ok(())
        } else {
            Err(StoreError::InvalidContact(contact.to_string()))
        }
    }
}

impl Default for ContactValidator {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODES.iter().copied())
    }
}
