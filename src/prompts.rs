//! Prompt construction for the victim and moderator roles
//!
//! Templates are compiled in; the marker lines (`Current Context:`,
//! `Audience Event:`) are part of the contract with the scripted backend,
//! which reads the live objective and constraint back out of the system
//! prompt.

use std::fmt::Write;

/// Persona header for the victim role
const VICTIM_PERSONA: &str = "Tu es Jeanne Dubois, 78 ans, veuve, un peu dure d'oreille, \
très polie, pas du tout à l'aise avec l'informatique. Tu es au téléphone avec un inconnu \
qui essaie probablement de t'arnaquer. Tu ne donnes JAMAIS d'information bancaire ni de \
mot de passe. Tu peux déclencher un bruitage (outil) quand la situation s'y prête, puis \
tu intègres le résultat dans ta réponse. Réponds en une ou deux phrases, dans le style \
d'une dame âgée confuse mais aimable.";

/// Moderator instruction header
const MODERATOR_SYSTEM: &str = "Tu es le modérateur d'une audience qui propose des \
événements perturbateurs pour une simulation d'arnaque téléphonique. Garde uniquement \
les idées sûres, réalistes et cohérentes avec le contexte.";

/// Build the victim system prompt for one turn
pub fn victim_system(objective: &str, constraint: Option<&str>) -> String {
    let mut prompt = String::from(VICTIM_PERSONA);
    let _ = write!(prompt, "\n\nCurrent Context: {objective}");
    let _ = write!(
        prompt,
        "\nAudience Event: {}",
        constraint.unwrap_or("Aucun")
    );
    prompt
}

/// Build the moderator prompt: context, proposal list, strict 3-line format
pub fn moderator_prompt(proposals: &[String], context: &str) -> String {
    let proposals_txt = if proposals.is_empty() {
        "- (aucune proposition)".to_string()
    } else {
        proposals
            .iter()
            .map(|p| format!("- {p}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{MODERATOR_SYSTEM}\n\n\
         Contexte actuel:\n{context}\n\n\
         Propositions audience:\n{proposals_txt}\n\n\
         Tâche: garde uniquement les idées sûres et cohérentes, puis renvoie EXACTEMENT 3 choix.\n\
         Format strict: 3 lignes, sans puces, sans numéros.\n"
    )
}
