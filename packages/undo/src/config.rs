use serde::{Deserialize, Serialize};

/// Behavior knobs for a `CommandStack`
///
/// Hosts usually embed this in their own settings file, so every field has a
/// serde default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    /// Maximum number of history entries kept (0 = unlimited)
    /// When exceeded, the oldest entry is evicted
    #[serde(default)]
    pub max_levels: usize,

    /// Offer each pushed command to the previous one for merging
    #[serde(default = "default_merge_commands")]
    pub merge_commands: bool,
}

fn default_merge_commands() -> bool {
    true
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            max_levels: 0,
            merge_commands: default_merge_commands(),
        }
    }
}

impl StackConfig {
    /// Keep every entry ever pushed
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Keep at most `max_levels` entries
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            max_levels,
            ..Default::default()
        }
    }

    /// Disable command merging
    pub fn without_merging(self) -> Self {
        Self {
            merge_commands: false,
            ..self
        }
    }

    pub(crate) fn exceeds_limit(&self, len: usize) -> bool {
        self.max_levels > 0 && len > self.max_levels
    }
}
