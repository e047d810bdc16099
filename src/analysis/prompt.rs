//! Closed set of analysis kinds and their prompt templates.
//!
//! Free-text analysis selection is a caller error at the API/CLI boundary;
//! the template lookup itself is total over the enum, so no hidden default
//! can mask a typo. `parse_or_summary` exists for lenient callers and logs
//! when the fall-back fires.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Summary,
    ActionItems,
    KeyDecisions,
    FollowUp,
    ParticipantAnalysis,
    Sentiment,
}

impl AnalysisKind {
    /// Human-readable label for rendered reports and share payloads.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Summary => "Meeting summary",
            Self::ActionItems => "Action items",
            Self::KeyDecisions => "Key decisions",
            Self::FollowUp => "Follow-up plan",
            Self::ParticipantAnalysis => "Participant analysis",
            Self::Sentiment => "Sentiment",
        }
    }

    /// Wire identifier used in config and the HTTP API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::ActionItems => "action_items",
            Self::KeyDecisions => "key_decisions",
            Self::FollowUp => "follow_up",
            Self::ParticipantAnalysis => "participant_analysis",
            Self::Sentiment => "sentiment",
        }
    }

    /// Instruction block prepended to the transcript.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Summary => {
                "Provide a detailed summary of the following meeting, covering:\n\
                 1. The main topics and focal points of discussion\n\
                 2. Key viewpoints and arguments raised\n\
                 3. Consensus reached or conclusions drawn\n\
                 4. Questions left unresolved\n\
                 Stay objective and structured."
            }
            Self::ActionItems => {
                "Extract the concrete action items from the following meeting, covering:\n\
                 1. The specific task to carry out\n\
                 2. The owner, where one was mentioned\n\
                 3. Deadlines or timeframes\n\
                 4. A priority assessment\n\
                 Answer as a list."
            }
            Self::KeyDecisions => {
                "List every significant decision made in the following meeting, covering:\n\
                 1. What exactly was decided\n\
                 2. The reasoning and background behind it\n\
                 3. Expected impact and consequences\n\
                 4. How and when it will be executed\n\
                 Order by importance."
            }
            Self::FollowUp => {
                "Draft a follow-up plan from the following meeting, covering:\n\
                 1. Items that need a check-in before the next meeting\n\
                 2. Open threads and who should pick each one up\n\
                 3. Suggested agenda points for the next session\n\
                 Keep it actionable."
            }
            Self::ParticipantAnalysis => {
                "Analyze the following meeting in depth, covering:\n\
                 1. Meeting efficiency and quality\n\
                 2. Each participant's contribution\n\
                 3. Discussion patterns and interaction dynamics\n\
                 4. Potential problems and suggestions for improvement\n\
                 5. How well the meeting met its goals\n\
                 Be objective and constructive."
            }
            Self::Sentiment => {
                "Assess the tone of the following meeting, covering:\n\
                 1. Overall sentiment and how it shifted over time\n\
                 2. Moments of tension or strong agreement\n\
                 3. Per-speaker tone, where speakers are labeled\n\
                 Support observations with short quotes."
            }
        }
    }

    /// Lenient parser preserving the legacy behavior of defaulting unknown
    /// kinds to a summary. Prefer strict parsing at API boundaries.
    pub fn parse_or_summary(value: &str) -> Self {
        match value {
            "summary" => Self::Summary,
            "action_items" => Self::ActionItems,
            "key_decisions" => Self::KeyDecisions,
            "follow_up" => Self::FollowUp,
            "participant_analysis" => Self::ParticipantAnalysis,
            "sentiment" => Self::Sentiment,
            other => {
                warn!("Unknown analysis kind '{}', defaulting to summary", other);
                Self::Summary
            }
        }
    }
}
