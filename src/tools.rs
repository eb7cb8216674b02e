//! Soundboard tool registry
//!
//! Four zero-argument sound cues the victim persona can trigger mid-turn.
//! Each cue resolves to a fixed bracketed tag embedded verbatim in reply
//! text; downstream consumers detect tags by substring match.

use crate::llm::ToolDescriptor;

/// One soundboard entry
struct SoundCue {
    name: &'static str,
    description: &'static str,
    tag: &'static str,
}

const CUES: &[SoundCue] = &[
    SoundCue {
        name: "dog_bark",
        description: "Joue un aboiement de chien.",
        tag: "[SOUND_EFFECT: DOG_BARKING]",
    },
    SoundCue {
        name: "doorbell",
        description: "Joue une sonnette.",
        tag: "[SOUND_EFFECT: DOORBELL]",
    },
    SoundCue {
        name: "coughing_fit",
        description: "Simule une quinte de toux.",
        tag: "[SOUND_EFFECT: COUGHING_FIT]",
    },
    SoundCue {
        name: "tv_background",
        description: "Bruit de télé en fond.",
        tag: "[SOUND_EFFECT: TV_BACKGROUND_LOUD]",
    },
];

/// Outcome of a cue lookup. An unknown name is not an error: the marker text
/// is sent back to the backend as the tool's result so the model can recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueResult {
    Tag(&'static str),
    Unknown(String),
}

impl CueResult {
    pub fn into_text(self) -> String {
        match self {
            CueResult::Tag(tag) => tag.to_string(),
            CueResult::Unknown(name) => format!("[UNKNOWN_TOOL: {name}]"),
        }
    }
}

/// Fixed catalog of sound cues
#[derive(Debug, Clone, Copy, Default)]
pub struct Soundboard;

impl Soundboard {
    /// Catalog entries advertised to the backend
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        CUES.iter()
            .map(|c| ToolDescriptor {
                name: c.name.to_string(),
                description: c.description.to_string(),
            })
            .collect()
    }

    /// Resolve a cue by name
    pub fn invoke(&self, name: &str) -> CueResult {
        match CUES.iter().find(|c| c.name == name) {
            Some(cue) => CueResult::Tag(cue.tag),
            None => CueResult::Unknown(name.to_string()),
        }
    }
}

/// Detect sound-effect tags embedded in reply text
pub fn sound_effect_tags(text: &str) -> Vec<&'static str> {
    CUES.iter()
        .filter(|c| text.contains(c.tag))
        .map(|c| c.tag)
        .collect()
}
