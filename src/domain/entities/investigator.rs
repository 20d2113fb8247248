//! Investigator entity - A player character tracked by a campaign

use serde::{Deserialize, Serialize};

const DEFAULT_NAME: &str = "Investigator";
const DEFAULT_HEALTH: u32 = 7;
const DEFAULT_SANITY: u32 = 7;

/// Investigator class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestigatorClass {
    #[default]
    Guardian,
    Seeker,
    Rogue,
    Mystic,
    Survivor,
    Neutral,
}

impl InvestigatorClass {
    /// Parse a class tag as written by current and legacy clients
    ///
    /// Accepts the wire ids, English names, and the Portuguese names legacy
    /// records were saved with. Anything else is neutral.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "guardian" | "guardião" | "guardiao" => Self::Guardian,
            "seeker" | "buscador" => Self::Seeker,
            "rogue" | "trapaceiro" => Self::Rogue,
            "mystic" | "místico" | "mistico" => Self::Mystic,
            "survivor" | "sobrevivente" => Self::Survivor,
            _ => Self::Neutral,
        }
    }
}

/// Long-term trauma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Trauma {
    pub physical: u32,
    pub mental: u32,
}

/// An investigator in a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investigator {
    pub name: String,
    pub class: InvestigatorClass,
    #[serde(rename = "health")]
    pub max_health: u32,
    #[serde(rename = "sanity")]
    pub max_sanity: u32,
    pub current_health: u32,
    pub current_sanity: u32,
    pub xp: u32,
    pub trauma: Trauma,
    pub eliminated: bool,
}

/// A single field edit applied to an investigator
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum InvestigatorEdit {
    Name(String),
    Class(InvestigatorClass),
    AdjustHealth(i32),
    AdjustSanity(i32),
    AdjustXp(i32),
    AdjustPhysicalTrauma(i32),
    AdjustMentalTrauma(i32),
    Eliminated(bool),
}

impl Default for Investigator {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            class: InvestigatorClass::Guardian,
            max_health: DEFAULT_HEALTH,
            max_sanity: DEFAULT_SANITY,
            current_health: DEFAULT_HEALTH,
            current_sanity: DEFAULT_SANITY,
            xp: 0,
            trauma: Trauma::default(),
            eliminated: false,
        }
    }
}

impl Investigator {
    pub fn new(name: impl Into<String>, class: InvestigatorClass) -> Self {
        Self {
            name: name.into(),
            class,
            ..Self::default()
        }
    }

    /// Apply one edit; current health and sanity stay within `[0, max]`
    pub fn apply(&mut self, edit: InvestigatorEdit) {
        match edit {
            InvestigatorEdit::Name(name) => self.name = name,
            InvestigatorEdit::Class(class) => self.class = class,
            InvestigatorEdit::AdjustHealth(delta) => {
                self.current_health = adjust(self.current_health, delta).min(self.max_health)
            }
            InvestigatorEdit::AdjustSanity(delta) => {
                self.current_sanity = adjust(self.current_sanity, delta).min(self.max_sanity)
            }
            InvestigatorEdit::AdjustXp(delta) => self.xp = adjust(self.xp, delta),
            InvestigatorEdit::AdjustPhysicalTrauma(delta) => {
                self.trauma.physical = adjust(self.trauma.physical, delta)
            }
            InvestigatorEdit::AdjustMentalTrauma(delta) => {
                self.trauma.mental = adjust(self.trauma.mental, delta)
            }
            InvestigatorEdit::Eliminated(eliminated) => self.eliminated = eliminated,
        }
    }
}

fn adjust(value: u32, delta: i32) -> u32 {
    if delta >= 0 {
        value.saturating_add(delta.unsigned_abs())
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}
