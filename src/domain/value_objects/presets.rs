//! Difficulty presets and campaign-type templates
//!
//! Both tables are static reference data. Lookups by an unknown key degrade
//! to an empty preset or template instead of failing.

use serde::Serialize;

use super::token::TokenKind;
use super::token_counts::TokenCounts;

use TokenKind::*;

/// A named token-count preset
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DifficultyPreset {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(serialize_with = "serialize_pairs")]
    pub tokens: &'static [(TokenKind, u32)],
}

/// A campaign type with its ordered scenario list
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CampaignTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub scenarios: &'static [&'static str],
}

pub const DIFFICULTY_PRESETS: [DifficultyPreset; 4] = [
    DifficultyPreset {
        key: "easy",
        label: "Easy",
        tokens: &[
            (PlusOne, 2),
            (Zero, 3),
            (MinusOne, 3),
            (MinusTwo, 2),
            (Skull, 2),
            (Cultist, 1),
            (Tablet, 1),
            (ElderSign, 1),
            (AutoFail, 1),
        ],
    },
    DifficultyPreset {
        key: "normal",
        label: "Normal",
        tokens: &[
            (PlusOne, 1),
            (Zero, 2),
            (MinusOne, 3),
            (MinusTwo, 2),
            (MinusThree, 1),
            (MinusFour, 1),
            (Skull, 2),
            (Cultist, 1),
            (Tablet, 1),
            (ElderSign, 1),
            (AutoFail, 1),
        ],
    },
    DifficultyPreset {
        key: "hard",
        label: "Hard",
        tokens: &[
            (Zero, 3),
            (MinusOne, 2),
            (MinusTwo, 2),
            (MinusThree, 2),
            (MinusFour, 1),
            (MinusFive, 1),
            (Skull, 2),
            (Cultist, 1),
            (Tablet, 1),
            (ElderSign, 1),
            (AutoFail, 1),
        ],
    },
    DifficultyPreset {
        key: "expert",
        label: "Expert",
        tokens: &[
            (Zero, 1),
            (MinusOne, 2),
            (MinusTwo, 2),
            (MinusThree, 2),
            (MinusFour, 2),
            (MinusFive, 1),
            (MinusSix, 1),
            (MinusEight, 1),
            (Skull, 2),
            (Cultist, 1),
            (Tablet, 1),
            (ElderSign, 1),
            (AutoFail, 1),
        ],
    },
];

pub const CAMPAIGN_TEMPLATES: [CampaignTemplate; 11] = [
    CampaignTemplate {
        key: "night-of-the-zealot",
        name: "The Night of the Zealot",
        scenarios: &["The Gathering", "The Midnight Masks", "The Devourer Below"],
    },
    CampaignTemplate {
        key: "dunwich-legacy",
        name: "The Dunwich Legacy",
        scenarios: &[
            "Extracurricular Activity",
            "The House Always Wins",
            "The Miskatonic Museum",
            "The Essex County Express",
            "Blood on the Altar",
            "Undimensioned and Unseen",
            "Where Doom Awaits",
            "Lost in Time and Space",
        ],
    },
    CampaignTemplate {
        key: "path-to-carcosa",
        name: "The Path to Carcosa",
        scenarios: &[
            "Curtain Call",
            "The Last King",
            "Echoes of the Past",
            "The Unspeakable Oath",
            "A Phantom of Truth",
            "The Pallid Mask",
            "Black Stars Rise",
            "Dim Carcosa",
        ],
    },
    CampaignTemplate {
        key: "forgotten-age",
        name: "The Forgotten Age",
        scenarios: &[
            "The Untamed Wilds",
            "The Doom of Eztli",
            "Threads of Fate",
            "The Boundary Beyond",
            "Heart of the Elders",
            "The City of Archives",
            "The Depths of Yoth",
            "Shattered Aeons",
        ],
    },
    CampaignTemplate {
        key: "circle-undone",
        name: "The Circle Undone",
        scenarios: &[
            "The Witching Hour",
            "At Death's Doorstep",
            "The Secret Name",
            "The Wages of Sin",
            "For the Greater Good",
            "Union and Disillusion",
            "In the Clutches of Chaos",
            "Before the Black Throne",
        ],
    },
    CampaignTemplate {
        key: "dream-eaters",
        name: "The Dream-Eaters",
        scenarios: &[
            "Beyond the Gates of Sleep",
            "Waking Nightmare",
            "The Search for Kadath",
            "A Thousand Shapes of Horror",
            "Dark Side of the Moon",
            "Point of No Return",
            "Where the Gods Dwell",
            "Weaver of the Cosmos",
        ],
    },
    CampaignTemplate {
        key: "innsmouth",
        name: "The Innsmouth Conspiracy",
        scenarios: &[
            "The Pit of Despair",
            "The Vanishing of Elina Harper",
            "In Too Deep",
            "Devil Reef",
            "Horror in High Gear",
            "A Light in the Fog",
            "The Lair of Dagon",
            "Into the Maelstrom",
        ],
    },
    CampaignTemplate {
        key: "edge-of-earth",
        name: "Edge of the Earth",
        scenarios: &[
            "Ice and Death",
            "Fatal Mirage",
            "To the Forbidden Peaks",
            "City of the Elder Things",
            "The Heart of Madness",
        ],
    },
    CampaignTemplate {
        key: "scarlet-keys",
        name: "The Scarlet Keys",
        scenarios: &[
            "Riddles and Rain",
            "Dead Heat",
            "Sanguine Shadows",
            "Dealings in the Dark",
            "Dancing Mad",
            "On Thin Ice",
            "Dogs of War",
            "Shades of Suffering",
            "Without a Trace",
            "Congress of the Keys",
        ],
    },
    CampaignTemplate {
        key: "feast-hemlock",
        name: "The Feast of Hemlock Vale",
        scenarios: &[
            "The Longest Night",
            "The Twisted Hollow",
            "Hemlock House",
            "The Silent Heath",
            "The Lost Sister",
            "The Thing in the Depths",
        ],
    },
    CampaignTemplate {
        key: "standalone",
        name: "Standalone Scenario",
        scenarios: &["Scenario 1"],
    },
];

pub fn find_difficulty(key: &str) -> Option<&'static DifficultyPreset> {
    DIFFICULTY_PRESETS.iter().find(|p| p.key == key)
}

pub fn find_campaign_template(key: &str) -> Option<&'static CampaignTemplate> {
    CAMPAIGN_TEMPLATES.iter().find(|t| t.key == key)
}

/// Token counts for a difficulty: all catalog tokens at zero overlaid with the preset
///
/// An unknown difficulty yields all zeros.
pub fn difficulty_counts(key: &str) -> TokenCounts {
    match find_difficulty(key) {
        Some(preset) => TokenCounts::from_pairs(preset.tokens),
        None => {
            tracing::debug!(difficulty = %key, "Unknown difficulty, using an empty bag");
            TokenCounts::empty()
        }
    }
}

/// Scenario names for a campaign type; empty for an unknown type
pub fn campaign_scenarios(key: &str) -> &'static [&'static str] {
    find_campaign_template(key)
        .map(|t| t.scenarios)
        .unwrap_or(&[])
}

fn serialize_pairs<S: serde::Serializer>(
    pairs: &&'static [(TokenKind, u32)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(pairs.iter().map(|(kind, count)| (kind.id(), *count)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easy_preset_overlays_zero_defaults() {
        let counts = difficulty_counts("easy");
        let expected = [
            (PlusOne, 2),
            (Zero, 3),
            (MinusOne, 3),
            (MinusTwo, 2),
            (Skull, 2),
            (Cultist, 1),
            (Tablet, 1),
            (ElderSign, 1),
            (AutoFail, 1),
        ];
        for kind in TokenKind::ALL {
            let want = expected
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|(_, c)| *c)
                .unwrap_or(0);
            assert_eq!(counts.get(kind), want, "count for {}", kind);
        }
        assert_eq!(counts.total(), 16);
    }

    #[test]
    fn test_unknown_keys_degrade_to_empty() {
        assert!(difficulty_counts("nightmare").is_empty());
        assert!(campaign_scenarios("no-such-cycle").is_empty());
    }

    #[test]
    fn test_template_scenario_order() {
        let scenarios = campaign_scenarios("night-of-the-zealot");
        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0], "The Gathering");
        assert_eq!(campaign_scenarios("scarlet-keys").len(), 10);
    }
}
