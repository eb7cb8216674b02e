//! Deterministic rule-based stand-in backend
//!
//! Canonical implementation for offline runs and the test suite: given the
//! same request it always produces the same reply. It plays the victim
//! persona with a small intent rule table, simulates the tool-call protocol
//! (one round of sound cues, then a final reply folding the cue tag in), and
//! answers moderator prompts by echoing back the proposal lines.

use super::types::{ChatReply, ChatRequest, ContentBlock, MessageRole, ToolCallRequest};
use super::{BackendError, ChatBackend};
use async_trait::async_trait;

/// Marker lines the victim system prompt carries; the scripted backend reads
/// the live objective and audience event back out of them.
pub const OBJECTIVE_MARKER: &str = "Current Context:";
pub const AUDIENCE_MARKER: &str = "Audience Event:";

/// Marker the moderator prompt carries
const MODERATOR_MARKER: &str = "Propositions audience:";

const URGENCY_KEYWORDS: &[&str] = &[
    "vite",
    "urgent",
    "tout de suite",
    "immédiatement",
    "dépêchez",
];

const TECH_SUPPORT_KEYWORDS: &[&str] = &["microsoft", "windows", "virus", "support"];

/// Deterministic scripted backend
pub struct ScriptedBackend;

impl ScriptedBackend {
    fn parse_marker(system: &str, marker: &str) -> String {
        system
            .lines()
            .find_map(|line| line.trim().strip_prefix(marker))
            .unwrap_or("")
            .trim()
            .to_string()
    }

    fn last_human_text(request: &ChatRequest) -> String {
        request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Human && !m.has_tool_result())
            .map(super::types::ChatMessage::text)
            .unwrap_or_default()
    }

    /// Decide whether to request a sound cue, in the original priority order:
    /// audience event first, then scammer pressure, then tech-support chatter.
    fn maybe_tool_call(request: &ChatRequest, human: &str, audience: &str) -> Option<ChatReply> {
        let offered = |name: &str| request.tools.iter().any(|t| t.name == name);
        let call = |name: &str| {
            Some(ChatReply::ToolCalls {
                calls: vec![ToolCallRequest::new(format!("scripted-{name}"), name)],
            })
        };

        if request.tools.is_empty() {
            return None;
        }

        let audience = audience.to_lowercase();
        if (audience.contains("sonne") || audience.contains("porte")) && offered("doorbell") {
            return call("doorbell");
        }

        let t = human.to_lowercase();
        if URGENCY_KEYWORDS.iter().any(|k| t.contains(k)) {
            if offered("dog_bark") {
                return call("dog_bark");
            }
            if offered("coughing_fit") {
                return call("coughing_fit");
            }
        }

        if TECH_SUPPORT_KEYWORDS.iter().any(|k| t.contains(k)) && offered("tv_background") {
            return call("tv_background");
        }

        None
    }

    /// Final reply after a tool round: fold the cue tag into the text the way
    /// Jeanne would react to it.
    fn after_tool_reply(system: &str, tool_output: &str) -> String {
        let obj = {
            let parsed = Self::parse_marker(system, OBJECTIVE_MARKER);
            if parsed.is_empty() {
                "Gagner du temps.".to_string()
            } else {
                parsed
            }
        };

        let reaction = if tool_output.contains("DOORBELL") {
            "Oh… on sonne à la porte… je reviens… ne raccrochez pas hein…"
        } else if tool_output.contains("DOG_BARKING") {
            "Oh là là… Poupoune devient folle… excusez-moi…"
        } else if tool_output.contains("COUGHING_FIT") {
            "*khm khm*… pardon… je tousse… j'ai la gorge sèche…"
        } else if tool_output.contains("TV_BACKGROUND") {
            "Oh… la télé était trop forte… je baisse…"
        } else {
            "Euh… oui… alors…"
        };

        format!("{tool_output}\n{reaction}  \n_(Objectif: {obj})_")
    }

    fn jeanne_reply(system: &str, human: &str) -> String {
        let obj = {
            let parsed = Self::parse_marker(system, OBJECTIVE_MARKER);
            if parsed.is_empty() {
                "Répondre poliment mais lentement.".to_string()
            } else {
                parsed
            }
        };
        let audience = Self::parse_marker(system, AUDIENCE_MARKER);

        let t = human.to_lowercase();

        let financial = [
            "2000", "euro", "€", "paiement", "virement", "iban", "rib", "carte", "cvc", "cvv",
        ];
        let remote = [
            "installer",
            "télécharger",
            "teamviewer",
            "anydesk",
            "contrôle à distance",
            "clic",
            "lien",
        ];
        let authority = [
            "microsoft",
            "support",
            "windows",
            "virus",
            "sécurité",
            "ordinateur",
        ];

        let (base, follow) = if financial.iter().any(|k| t.contains(k)) {
            (
                "Oh non non… je ne fais jamais de paiement au téléphone… c'est mon fils qui s'occupe de ça.",
                "Vous pouvez m'envoyer un courrier officiel si c'est sérieux.",
            )
        } else if remote.iter().any(|k| t.contains(k)) {
            (
                "Attendez… je vois bien l'ordinateur, mais je ne sais pas où il faut cliquer…",
                "Je ne télécharge rien sans mon petit-fils, vous comprenez.",
            )
        } else if authority.iter().any(|k| t.contains(k)) {
            (
                "Ah bon… un virus ? C'est grave ça… mais je ne comprends pas, je n'ai rien fait.",
                "Vous avez un numéro officiel, monsieur ?",
            )
        } else {
            (
                "Oh… je suis désolée… je ne comprends pas très bien…",
                "Vous pouvez répéter doucement ?",
            )
        };

        let aud = if audience.is_empty() || audience.eq_ignore_ascii_case("aucun") {
            String::new()
        } else {
            format!(" (Je suis distraite: {audience})")
        };

        format!("{base} {follow}{aud}  \n_(Objectif: {obj})_")
    }

    /// Moderator prompts get the proposal lines echoed back, up to three.
    fn moderator_reply(human: &str) -> String {
        human
            .lines()
            .skip_while(|l| !l.starts_with(MODERATOR_MARKER))
            .filter_map(|l| l.strip_prefix("- "))
            .filter(|l| *l != "(aucune proposition)")
            .take(3)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        // A tool round just finished: produce the final reply from the results
        if let Some(last) = request.messages.last() {
            if last.has_tool_result() {
                let tool_output = last
                    .content
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::ToolResult { content, .. } => Some(content.as_str()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                return Ok(ChatReply::Final {
                    text: Self::after_tool_reply(&request.system, &tool_output),
                });
            }
        }

        let human = Self::last_human_text(request);

        if human.contains(MODERATOR_MARKER) {
            return Ok(ChatReply::Final {
                text: Self::moderator_reply(&human),
            });
        }

        let audience = Self::parse_marker(&request.system, AUDIENCE_MARKER);
        if let Some(reply) = Self::maybe_tool_call(request, &human, &audience) {
            return Ok(reply);
        }

        Ok(ChatReply::Final {
            text: Self::jeanne_reply(&request.system, &human),
        })
    }

    fn backend_id(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, ToolDescriptor, ToolResult};

    fn soundboard_tools() -> Vec<ToolDescriptor> {
        ["dog_bark", "doorbell", "coughing_fit", "tv_background"]
            .iter()
            .map(|n| ToolDescriptor {
                name: (*n).to_string(),
                description: String::new(),
            })
            .collect()
    }

    fn system(objective: &str, audience: &str) -> String {
        format!("Tu es Jeanne.\nCurrent Context: {objective}\nAudience Event: {audience}")
    }

    #[tokio::test]
    async fn test_deterministic_given_same_request() {
        let req = ChatRequest::new(
            system("Gagner du temps.", "Aucun"),
            vec![ChatMessage::human("Bonjour madame")],
        );
        let a = ScriptedBackend.complete(&req).await.unwrap();
        let b = ScriptedBackend.complete(&req).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_urgency_triggers_dog_bark() {
        let req = ChatRequest::new(
            system("Gagner du temps.", "Aucun"),
            vec![ChatMessage::human("Faites vite madame, c'est urgent !")],
        )
        .with_tools(soundboard_tools());

        match ScriptedBackend.complete(&req).await.unwrap() {
            ChatReply::ToolCalls { calls } => assert_eq!(calls[0].name, "dog_bark"),
            ChatReply::Final { .. } => panic!("expected tool call"),
        }
    }

    #[tokio::test]
    async fn test_doorbell_audience_event_takes_priority() {
        let req = ChatRequest::new(
            system("Gagner du temps.", "Quelqu'un sonne à la porte"),
            vec![ChatMessage::human("Vite, installez le logiciel !")],
        )
        .with_tools(soundboard_tools());

        match ScriptedBackend.complete(&req).await.unwrap() {
            ChatReply::ToolCalls { calls } => assert_eq!(calls[0].name, "doorbell"),
            ChatReply::Final { .. } => panic!("expected tool call"),
        }
    }

    #[tokio::test]
    async fn test_no_tools_offered_means_no_tool_calls() {
        let req = ChatRequest::new(
            system("Gagner du temps.", "Aucun"),
            vec![ChatMessage::human("Vite, c'est urgent !")],
        );
        assert!(matches!(
            ScriptedBackend.complete(&req).await.unwrap(),
            ChatReply::Final { .. }
        ));
    }

    #[tokio::test]
    async fn test_after_tool_round_produces_final_text() {
        let calls = vec![ToolCallRequest::new("scripted-doorbell", "doorbell")];
        let results = vec![ToolResult {
            id: "scripted-doorbell".to_string(),
            text: "[SOUND_EFFECT: DOORBELL]".to_string(),
        }];
        let req = ChatRequest::new(
            system("Gagner du temps.", "Quelqu'un sonne à la porte"),
            vec![
                ChatMessage::human("Vous m'entendez ?"),
                ChatMessage::assistant_tool_calls(&calls),
                ChatMessage::tool_results(&results),
            ],
        );

        match ScriptedBackend.complete(&req).await.unwrap() {
            ChatReply::Final { text } => {
                assert!(text.contains("[SOUND_EFFECT: DOORBELL]"));
                assert!(text.contains("on sonne à la porte"));
                assert!(text.contains("Gagner du temps."));
            }
            ChatReply::ToolCalls { .. } => panic!("expected final reply"),
        }
    }

    #[tokio::test]
    async fn test_reply_echoes_objective_and_audience() {
        let req = ChatRequest::new(
            system("Refuser poliment.", "Le chien aboie fort"),
            vec![ChatMessage::human("Bonjour")],
        );
        match ScriptedBackend.complete(&req).await.unwrap() {
            ChatReply::Final { text } => {
                assert!(text.contains("_(Objectif: Refuser poliment.)_"));
                assert!(text.contains("Je suis distraite: Le chien aboie fort"));
            }
            ChatReply::ToolCalls { .. } => panic!("expected final reply"),
        }
    }

    #[tokio::test]
    async fn test_moderator_prompt_echoes_proposals() {
        let prompt = "Contexte actuel:\nGagner du temps.\n\nPropositions audience:\n- Le chat miaule\n- Orage dehors\n\nTâche: renvoie EXACTEMENT 3 choix.";
        let req = ChatRequest::new("", vec![ChatMessage::human(prompt)]);
        match ScriptedBackend.complete(&req).await.unwrap() {
            ChatReply::Final { text } => {
                assert_eq!(text, "Le chat miaule\nOrage dehors");
            }
            ChatReply::ToolCalls { .. } => panic!("expected final reply"),
        }
    }
}
