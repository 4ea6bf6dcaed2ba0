use serde::{Deserialize, Serialize};

/// Lifecycle stage of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Participants are submitting availability.
    #[default]
    Scheduling,
    /// Candidate times and places are published and participants vote.
    Voting,
    /// The final choice was made (or there was nothing to decide). Terminal.
    Finalized,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduling => "scheduling",
            Self::Voting => "voting",
            Self::Finalized => "finalized",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
