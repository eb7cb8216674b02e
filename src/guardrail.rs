//! Outgoing-reply safety filter
//!
//! A literal case-insensitive denylist over financial-identifier and
//! credential terms, checked against the reply text just before emission.
//! This is a presentation-layer guard: the unfiltered reply stays in the
//! victim's internal history.

/// Denylisted substrings, matched case-insensitively
const DENYLIST: &[&str] = &[
    "iban",
    "rib",
    "numéro de carte",
    "carte bancaire",
    "cvc",
    "cvv",
    "mot de passe",
    "code sms",
];

/// Fixed notice shown in place of a blocked reply
pub const BLOCK_NOTICE: &str =
    "🚫 La réponse contenait potentiellement des informations sensibles. Réponse bloquée.";

/// Check outgoing text against the denylist. Returns the matched term.
pub fn screen(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    DENYLIST.iter().find(|term| lowered.contains(**term)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_denylist_is_case_insensitive() {
        assert_eq!(screen("mon IBAN est FR76…"), Some("iban"));
        assert_eq!(screen("mon iban est FR76…"), Some("iban"));
        assert_eq!(screen("Mon Iban"), Some("iban"));
    }

    #[test]
    fn test_clean_text_passes() {
        assert_eq!(screen("Oh… je ne comprends pas très bien…"), None);
        assert_eq!(screen(""), None);
    }

    #[test]
    fn test_credential_terms_blocked() {
        assert!(screen("je vous donne mon Mot De Passe").is_some());
        assert!(screen("le code SMS est 1234").is_some());
        assert!(screen("ma Carte Bancaire finit par 42").is_some());
    }

    proptest! {
        // Digits and spaces around the term cannot form any other denylist
        // entry, so the match is exactly the embedded one.
        #[test]
        fn prop_embedded_iban_always_blocked(
            prefix in "[0-9 ]{0,20}",
            term in "[iI][bB][aA][nN]",
            suffix in "[0-9 ]{0,20}",
        ) {
            prop_assert_eq!(screen(&format!("{prefix}{term}{suffix}")), Some("iban"));
        }

        // Every denylist entry contains letters, so letterless text can
        // never match.
        #[test]
        fn prop_letterless_text_passes(text in "[0-9 .,!?€]{0,60}") {
            prop_assert_eq!(screen(&text), None);
        }
    }
}
