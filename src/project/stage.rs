use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow position of an icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Asked for, not drawn yet
    Requested,
    /// Drawn and shipped
    Finished,
}

impl Stage {
    pub const ALL: [Stage; 2] = [Stage::Requested, Stage::Finished];

    /// Folder name and wire name of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Finished => "finished",
        }
    }

    /// The stage an icon leaves when it enters this one
    pub fn other(&self) -> Self {
        match self {
            Self::Requested => Self::Finished,
            Self::Finished => Self::Requested,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
