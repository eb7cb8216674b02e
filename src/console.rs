//! Line-based console implementation of the simulation I/O seam
//!
//! One line in per scammer turn, up to five proposal lines plus one vote
//! token for the audience path, one reply block out. Generic over the
//! reader/writer so tests can drive it with in-memory buffers.

use crate::audience::MAX_PROPOSALS;
use crate::orchestrator::{SimulationIo, TurnReport};
use std::io::{BufRead, Write};

const BANNER: &str = "SIMULATEUR D'ARNAQUE (LLM + Tools)\nTape 'quit' pour quitter";

/// Console front-end
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<std::io::BufReader<std::io::Stdin>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self {
            input: std::io::BufReader::new(std::io::stdin()),
            output: std::io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn print_banner(&mut self) {
        let _ = writeln!(self.output, "=== {} ===", BANNER.replace('\n', " — "));
    }

    /// Prompt and read one trimmed line; `None` on EOF
    fn prompt(&mut self, text: &str) -> Option<String> {
        let _ = write!(self.output, "{text}");
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl<R: BufRead, W: Write> SimulationIo for Console<R, W> {
    fn next_utterance(&mut self) -> Option<String> {
        let line = self.prompt("Arnaqueur > ")?;
        if line.eq_ignore_ascii_case("quit") {
            return None;
        }
        Some(line)
    }

    fn collect_proposals(&mut self) -> Vec<String> {
        let _ = writeln!(
            self.output,
            "\nAudience > Propose 1 à 5 idées (ligne vide pour finir)."
        );

        let mut proposals = Vec::new();
        while proposals.len() < MAX_PROPOSALS {
            let Some(line) = self.prompt("Audience idée > ") else {
                break;
            };
            if line.is_empty() {
                break;
            }
            proposals.push(line);
        }
        proposals
    }

    fn cast_vote(&mut self, choices: &[String]) -> String {
        let _ = writeln!(self.output, "\n--- Vote audience ---");
        for (i, choice) in choices.iter().enumerate() {
            let _ = writeln!(self.output, "{}. {choice}", i + 1);
        }
        self.prompt("Choisis 1/2/3 (entrée = 1 par défaut) > ")
            .unwrap_or_default()
    }

    fn emit(&mut self, report: &TurnReport) {
        let _ = writeln!(self.output, "\nJeanne: {}", report.reply);
        let _ = writeln!(self.output, "(objectif: {})", report.objective);
        let _ = writeln!(self.output);
    }
}
