// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., U_K7NP3X for users)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User account (U_)
    User,
    /// Subscription (SB_)
    Subscription,
    /// Payment record (PM_)
    Payment,
    /// Contact form submission (CT_)
    Contact,
    /// Waitlist entry (WL_)
    Waitlist,
    /// Marketing content block (CN_)
    Content,
    /// Analytics event (EV_)
    Analytics,
    /// AI chat exchange (CH_)
    Chat,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Subscription => "SB",
            EntityPrefix::Payment => "PM",
            EntityPrefix::Contact => "CT",
            EntityPrefix::Waitlist => "WL",
            EntityPrefix::Content => "CN",
            EntityPrefix::Analytics => "EV",
            EntityPrefix::Chat => "CH",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Arguments
/// * `prefix` - The entity type prefix
///
/// # Returns
/// A string in format "PREFIX_XXXXXX" (e.g., "U_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Subscription ID (SB_XXXXXX)
pub fn generate_subscription_id() -> String {
    generate_id(EntityPrefix::Subscription)
}

/// Generate a Payment ID (PM_XXXXXX)
pub fn generate_payment_id() -> String {
    generate_id(EntityPrefix::Payment)
}

/// Generate a Contact ID (CT_XXXXXX)
pub fn generate_contact_id() -> String {
    generate_id(EntityPrefix::Contact)
}

/// Generate a Waitlist ID (WL_XXXXXX)
pub fn generate_waitlist_id() -> String {
    generate_id(EntityPrefix::Waitlist)
}

/// Generate a Content ID (CN_XXXXXX)
pub fn generate_content_id() -> String {
    generate_id(EntityPrefix::Content)
}

/// Generate an Analytics event ID (EV_XXXXXX)
pub fn generate_analytics_id() -> String {
    generate_id(EntityPrefix::Analytics)
}

/// Generate a Chat ID (CH_XXXXXX)
pub fn generate_chat_id() -> String {
    generate_id(EntityPrefix::Chat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let user_id = generate_user_id();
        assert!(user_id.starts_with("U_"));
        assert_eq!(user_id.len(), 8); // "U_" + 6 chars

        let sub_id = generate_subscription_id();
        assert!(sub_id.starts_with("SB_"));
        assert_eq!(sub_id.len(), 9);
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_user_id();
        let random_part = &id[2..]; // Skip "U_"

        for c in random_part.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }

        // Verify no ambiguous characters
        assert!(!random_part.contains('I'));
        assert!(!random_part.contains('L'));
        assert!(!random_part.contains('O'));
        assert!(!random_part.contains('U'));
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_user_id();
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_all_prefixes() {
        assert!(generate_user_id().starts_with("U_"));
        assert!(generate_subscription_id().starts_with("SB_"));
        assert!(generate_payment_id().starts_with("PM_"));
        assert!(generate_contact_id().starts_with("CT_"));
        assert!(generate_waitlist_id().starts_with("WL_"));
        assert!(generate_content_id().starts_with("CN_"));
        assert!(generate_analytics_id().starts_with("EV_"));
        assert!(generate_chat_id().starts_with("CH_"));
    }
}
