//! Director role: derives a one-sentence objective from the latest scammer
//! utterance
//!
//! Pure rule-table classification, no memory, no backend. Categories are
//! evaluated in a fixed priority order so an utterance matching several
//! keyword sets resolves deterministically (financial wins over
//! remote-access, which wins over authority impersonation).

/// Stalling objective returned when nothing matches
pub const DEFAULT_OBJECTIVE: &str = "Rester confuse et demander de répéter.";

struct Rule {
    keywords: &'static [&'static str],
    objective: &'static str,
}

/// Ordered rule table; first match wins
const RULES: &[Rule] = &[
    // Payment / financial-data requests
    Rule {
        keywords: &[
            "payer", "paiement", "carte", "iban", "rib", "virement", "euro", "cvc", "cvv",
        ],
        objective: "Refuser poliment et détourner la discussion.",
    },
    // Remote-access / installation requests
    Rule {
        keywords: &[
            "installer",
            "télécharger",
            "teamviewer",
            "anydesk",
            "contrôle à distance",
            "lien",
            "clic",
        ],
        objective: "Faire semblant de ne pas trouver le bouton.",
    },
    // Authority / tech-support impersonation
    Rule {
        keywords: &["microsoft", "windows", "virus", "support", "sécurité"],
        objective: "Demander un numéro officiel pour vérifier, et gagner du temps.",
    },
];

/// Rule-table director
#[derive(Debug, Clone, Copy, Default)]
pub struct Director;

impl Director {
    /// Classify the utterance and return the matching canned objective.
    /// Never returns an empty string.
    pub fn analyze(&self, scammer_text: &str) -> String {
        let text = scammer_text.to_lowercase();
        for rule in RULES {
            if rule.keywords.iter().any(|k| text.contains(k)) {
                return rule.objective.to_string();
            }
        }
        DEFAULT_OBJECTIVE.to_string()
    }
}
