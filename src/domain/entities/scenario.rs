//! Scenario entity - One step of a campaign's scenario checklist

use serde::{Deserialize, Serialize};

/// A scenario within a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,
    pub completed: bool,
    /// Resolution reached, as free text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub xp_earned: u32,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: false,
            resolution: None,
            xp_earned: 0,
        }
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    /// Set the resolution text; blank text clears it
    pub fn set_resolution(&mut self, resolution: impl Into<String>) {
        let resolution = resolution.into();
        self.resolution = if resolution.trim().is_empty() {
            None
        } else {
            Some(resolution)
        };
    }
}
