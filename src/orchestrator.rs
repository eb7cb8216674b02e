//! Turn orchestration state machine
//!
//! One turn: scammer utterance in, objective update, optional audience
//! round, victim reply, safety filter, emission. The loop is single-threaded
//! and turn-synchronous; the only suspension points are the victim's and
//! moderator's backend calls. Quit is checked at the input boundary only,
//! between turns.

use crate::audience::{Audience, AudienceBallot, MAX_PROPOSALS};
use crate::guardrail;
use crate::roles::{Director, Victim};
use crate::tools::sound_effect_tags;

/// Objective in force before the director has seen anything
pub const INITIAL_OBJECTIVE: &str = "Répondre poliment mais lentement.";

/// Per-simulation mutable state, owned by the orchestrator and mutated only
/// between turns
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub turn: u64,
    pub running: bool,
    pub current_objective: String,
    pub audience_constraint: Option<String>,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            turn: 0,
            running: true,
            current_objective: INITIAL_OBJECTIVE.to_string(),
            audience_constraint: None,
        }
    }
}

/// What one completed turn emits to the presentation layer
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Victim reply, already filtered
    pub reply: String,
    /// Objective in force for this turn, as a side annotation
    pub objective: String,
    /// Whether the safety filter replaced the reply
    pub blocked: bool,
    /// Sound-effect tags detected in the outgoing text
    pub sound_effects: Vec<&'static str>,
}

/// Turn-boundary I/O seam. The console implements this; tests drive the
/// orchestrator with a scripted implementation.
pub trait SimulationIo {
    /// Next scammer utterance; `None` is the explicit quit signal
    fn next_utterance(&mut self) -> Option<String>;

    /// Collect raw audience proposals for this round (order preserved)
    fn collect_proposals(&mut self) -> Vec<String>;

    /// Present the ballot and return the raw vote token
    fn cast_vote(&mut self, choices: &[String]) -> String;

    /// Emit one completed turn
    fn emit(&mut self, report: &TurnReport);
}

/// The top-level state machine
pub struct Orchestrator {
    director: Director,
    victim: Victim,
    audience: Audience,
    state: SimulationState,
}

impl Orchestrator {
    pub fn new(director: Director, victim: Victim, audience: Audience) -> Self {
        Self {
            director,
            victim,
            audience,
            state: SimulationState::default(),
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Run turns until the quit signal
    pub async fn run(&mut self, io: &mut dyn SimulationIo) {
        while self.state.running {
            let Some(utterance) = io.next_utterance() else {
                self.state.running = false;
                break;
            };

            let report = self.step(&utterance, io).await;
            io.emit(&report);
            self.state.turn += 1;
        }
        tracing::info!(turns = self.state.turn, "simulation stopped");
    }

    /// Resolve one turn. The turn counter is incremented by the caller after
    /// emission.
    async fn step(&mut self, utterance: &str, io: &mut dyn SimulationIo) -> TurnReport {
        self.state.current_objective = self.director.analyze(utterance);
        tracing::debug!(objective = %self.state.current_objective, "director objective");

        // Never on turn 0, then every third turn: 3, 6, 9, …
        if self.state.turn % 3 == 0 && self.state.turn != 0 {
            self.run_audience_round(io).await;
        }

        let reply = self
            .victim
            .respond(
                utterance,
                &self.state.current_objective,
                self.state.audience_constraint.as_deref(),
            )
            .await;

        // Presentation-layer guard only: the unfiltered reply already sits in
        // the victim's history and will feed future turns.
        let (outgoing, blocked) = match guardrail::screen(&reply) {
            Some(term) => {
                tracing::warn!(term, "guardrail blocked outgoing reply");
                (guardrail::BLOCK_NOTICE.to_string(), true)
            }
            None => (reply, false),
        };

        let sound_effects = sound_effect_tags(&outgoing);
        for tag in &sound_effects {
            tracing::info!(effect = %tag, "sound effect emitted");
        }

        TurnReport {
            reply: outgoing,
            objective: self.state.current_objective.clone(),
            blocked,
            sound_effects,
        }
    }

    async fn run_audience_round(&mut self, io: &mut dyn SimulationIo) {
        let mut proposals = io.collect_proposals();
        proposals.truncate(MAX_PROPOSALS);

        let choices = self
            .audience
            .ballot_choices(&proposals, &self.state.current_objective)
            .await;
        let token = io.cast_vote(&choices);
        let ballot = AudienceBallot::new(proposals, choices, &token);

        tracing::info!(
            winner = %ballot.winner,
            proposals = ballot.proposals.len(),
            "audience event selected"
        );
        self.state.audience_constraint = Some(ballot.winner);
    }
}
