//! Audience subsystem: proposals, ballot, vote
//!
//! Proposals come from the presentation layer (max 5, insertion order).
//! An empty proposal round substitutes the fixed default ballot directly,
//! bypassing the moderator. The vote never blocks on bad input: anything
//! that isn't `1`, `2` or `3` selects the first choice.

use crate::roles::Moderator;

/// Fixed ballot used when nobody proposes anything
pub const DEFAULT_EVENTS: [&str; 3] = [
    "Quelqu'un sonne à la porte",
    "Le chien aboie fort",
    "Quinte de toux",
];

/// Hard cap on collected proposals
pub const MAX_PROPOSALS: usize = 5;

/// One audience round, discarded once the winner is folded into the
/// simulation's audience constraint
#[derive(Debug, Clone)]
pub struct AudienceBallot {
    pub proposals: Vec<String>,
    pub choices: Vec<String>,
    pub winner: String,
}

impl AudienceBallot {
    /// Seal one round: resolve the raw vote token against the choices
    pub fn new(proposals: Vec<String>, choices: Vec<String>, token: &str) -> Self {
        let winner = resolve_vote(&choices, token).to_string();
        Self {
            proposals,
            choices,
            winner,
        }
    }
}

/// Resolve a vote token against the ballot. `1`/`2`/`3` select the matching
/// choice; anything else (including empty input) defaults to the first.
pub fn resolve_vote<'a>(choices: &'a [String], selection: &str) -> &'a str {
    let index = match selection.trim() {
        "1" => 0,
        "2" => 1,
        "3" => 2,
        _ => 0,
    };
    choices.get(index).map_or("", |c| c.as_str())
}

/// Audience event pipeline
pub struct Audience {
    moderator: Moderator,
}

impl Audience {
    pub fn new(moderator: Moderator) -> Self {
        Self { moderator }
    }

    /// Produce the three ballot choices for this round
    pub async fn ballot_choices(&self, proposals: &[String], objective: &str) -> Vec<String> {
        if proposals.is_empty() {
            return DEFAULT_EVENTS.iter().map(|s| (*s).to_string()).collect();
        }
        let capped = &proposals[..proposals.len().min(MAX_PROPOSALS)];
        self.moderator.pick_three(capped, objective).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatReply;
    use crate::testing::MockBackend;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_vote_selects_by_token() {
        let choices = strings(&["A", "B", "C"]);
        assert_eq!(resolve_vote(&choices, "1"), "A");
        assert_eq!(resolve_vote(&choices, "2"), "B");
        assert_eq!(resolve_vote(&choices, "3"), "C");
    }

    #[test]
    fn test_vote_defaults_on_ambiguous_input() {
        let choices = strings(&["A", "B", "C"]);
        assert_eq!(resolve_vote(&choices, ""), "A");
        assert_eq!(resolve_vote(&choices, "9"), "A");
        assert_eq!(resolve_vote(&choices, "x"), "A");
        assert_eq!(resolve_vote(&choices, "  2  "), "B");
    }

    #[test]
    fn test_ballot_resolves_winner_from_token() {
        let ballot = AudienceBallot::new(
            strings(&["le chat miaule"]),
            strings(&["Un", "Deux", "Trois"]),
            "2",
        );
        assert_eq!(ballot.winner, "Deux");
        assert_eq!(ballot.proposals, strings(&["le chat miaule"]));
        assert_eq!(ballot.choices.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_proposals_bypass_moderator() {
        let backend = Arc::new(MockBackend::new());
        let audience = Audience::new(Moderator::new(backend.clone()));

        let choices = audience.ballot_choices(&[], "ctx").await;
        assert_eq!(choices, strings(&DEFAULT_EVENTS));
        // No backend call was made
        assert!(backend.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_proposals_capped_at_five() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_reply(ChatReply::final_text("Un\nDeux\nTrois"));
        let audience = Audience::new(Moderator::new(backend.clone()));

        let proposals = strings(&["p1", "p2", "p3", "p4", "p5", "p6", "p7"]);
        audience.ballot_choices(&proposals, "ctx").await;

        let requests = backend.recorded_requests();
        let prompt = requests[0].messages[0].text();
        assert!(prompt.contains("- p5"));
        assert!(!prompt.contains("- p6"));
    }

    proptest! {
        #[test]
        fn prop_vote_always_lands_in_ballot(token in ".{0,8}") {
            let choices = strings(&["A", "B", "C"]);
            let winner = resolve_vote(&choices, &token);
            prop_assert!(choices.iter().any(|c| c == winner));
            if !matches!(token.trim(), "1" | "2" | "3") {
                prop_assert_eq!(winner, "A");
            }
        }
    }
}
