//! Token catalog - The fixed set of chaos tokens that can go into the bag
//!
//! The catalog order defined by [`TokenKind::ALL`] is load-bearing: bags are
//! expanded in this order and count arrays are indexed by it.

use serde::{Deserialize, Serialize};

/// Identity of a chaos token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TokenKind {
    #[serde(rename = "plus1")]
    PlusOne,
    #[serde(rename = "zero")]
    Zero,
    #[serde(rename = "minus1")]
    MinusOne,
    #[serde(rename = "minus2")]
    MinusTwo,
    #[serde(rename = "minus3")]
    MinusThree,
    #[serde(rename = "minus4")]
    MinusFour,
    #[serde(rename = "minus5")]
    MinusFive,
    #[serde(rename = "minus6")]
    MinusSix,
    #[serde(rename = "minus7")]
    MinusSeven,
    #[serde(rename = "minus8")]
    MinusEight,
    #[serde(rename = "skull")]
    Skull,
    #[serde(rename = "cultist")]
    Cultist,
    #[serde(rename = "tablet")]
    Tablet,
    #[serde(rename = "elderThing")]
    ElderThing,
    #[serde(rename = "elderSign")]
    ElderSign,
    #[serde(rename = "autofail")]
    AutoFail,
    #[serde(rename = "bless")]
    Bless,
    #[serde(rename = "curse")]
    Curse,
    #[serde(rename = "frost")]
    Frost,
}

/// Visual class used by clients to style a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenClass {
    Positive,
    Numeric,
    Skull,
    Cultist,
    Tablet,
    ElderThing,
    ElderSign,
    AutoFail,
    Bless,
    Curse,
    Frost,
}

/// Feedback cue a client may play when a token comes out of the bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawCue {
    Success,
    Fail,
    Neutral,
}

/// Static description of a catalog token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub id: TokenKind,
    pub value: &'static str,
    pub name: &'static str,
    pub class: TokenClass,
}

impl TokenKind {
    /// Number of tokens in the catalog
    pub const COUNT: usize = 19;

    /// Every token in catalog order
    pub const ALL: [TokenKind; Self::COUNT] = [
        TokenKind::PlusOne,
        TokenKind::Zero,
        TokenKind::MinusOne,
        TokenKind::MinusTwo,
        TokenKind::MinusThree,
        TokenKind::MinusFour,
        TokenKind::MinusFive,
        TokenKind::MinusSix,
        TokenKind::MinusSeven,
        TokenKind::MinusEight,
        TokenKind::Skull,
        TokenKind::Cultist,
        TokenKind::Tablet,
        TokenKind::ElderThing,
        TokenKind::ElderSign,
        TokenKind::AutoFail,
        TokenKind::Bless,
        TokenKind::Curse,
        TokenKind::Frost,
    ];

    /// Position of this token in the catalog
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable wire identifier (`"plus1"`, `"elderSign"`, ...)
    pub fn id(self) -> &'static str {
        self.token().id_str()
    }

    /// Look up a token by its wire identifier
    pub fn from_id(id: &str) -> Option<Self> {
        CATALOG.iter().find(|t| t.id_str() == id).map(|t| t.id)
    }

    /// Catalog entry for this token
    pub fn token(self) -> &'static Token {
        &CATALOG[self.index()]
    }

    pub fn cue(self) -> DrawCue {
        match self {
            TokenKind::AutoFail | TokenKind::Curse => DrawCue::Fail,
            TokenKind::ElderSign | TokenKind::Bless | TokenKind::PlusOne => DrawCue::Success,
            _ => DrawCue::Neutral,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl Token {
    fn id_str(&self) -> &'static str {
        WIRE_IDS[self.id.index()]
    }
}

const WIRE_IDS: [&str; TokenKind::COUNT] = [
    "plus1", "zero", "minus1", "minus2", "minus3", "minus4", "minus5", "minus6", "minus7",
    "minus8", "skull", "cultist", "tablet", "elderThing", "elderSign", "autofail", "bless",
    "curse", "frost",
];

const fn numeric(id: TokenKind, value: &'static str) -> Token {
    Token {
        id,
        value,
        name: value,
        class: TokenClass::Numeric,
    }
}

/// The token catalog, in catalog order
pub const CATALOG: [Token; TokenKind::COUNT] = [
    Token {
        id: TokenKind::PlusOne,
        value: "+1",
        name: "+1",
        class: TokenClass::Positive,
    },
    numeric(TokenKind::Zero, "0"),
    numeric(TokenKind::MinusOne, "-1"),
    numeric(TokenKind::MinusTwo, "-2"),
    numeric(TokenKind::MinusThree, "-3"),
    numeric(TokenKind::MinusFour, "-4"),
    numeric(TokenKind::MinusFive, "-5"),
    numeric(TokenKind::MinusSix, "-6"),
    numeric(TokenKind::MinusSeven, "-7"),
    numeric(TokenKind::MinusEight, "-8"),
    Token {
        id: TokenKind::Skull,
        value: "💀",
        name: "Skull",
        class: TokenClass::Skull,
    },
    Token {
        id: TokenKind::Cultist,
        value: "👤",
        name: "Cultist",
        class: TokenClass::Cultist,
    },
    Token {
        id: TokenKind::Tablet,
        value: "📋",
        name: "Tablet",
        class: TokenClass::Tablet,
    },
    Token {
        id: TokenKind::ElderThing,
        value: "🐙",
        name: "Elder Thing",
        class: TokenClass::ElderThing,
    },
    Token {
        id: TokenKind::ElderSign,
        value: "⭐",
        name: "Elder Sign",
        class: TokenClass::ElderSign,
    },
    Token {
        id: TokenKind::AutoFail,
        value: "🌀",
        name: "Auto-fail",
        class: TokenClass::AutoFail,
    },
    Token {
        id: TokenKind::Bless,
        value: "✝️",
        name: "Bless",
        class: TokenClass::Bless,
    },
    Token {
        id: TokenKind::Curse,
        value: "😈",
        name: "Curse",
        class: TokenClass::Curse,
    },
    Token {
        id: TokenKind::Frost,
        value: "❄️",
        name: "Frost",
        class: TokenClass::Frost,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_in_declaration_order() {
        for (i, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(CATALOG[i].id, *kind);
        }
    }

    #[test]
    fn test_wire_ids_match_serde() {
        for kind in TokenKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.id()));
            assert_eq!(TokenKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(TokenKind::from_id("minus9"), None);
    }

    #[test]
    fn test_draw_cues() {
        assert_eq!(TokenKind::AutoFail.cue(), DrawCue::Fail);
        assert_eq!(TokenKind::Curse.cue(), DrawCue::Fail);
        assert_eq!(TokenKind::ElderSign.cue(), DrawCue::Success);
        assert_eq!(TokenKind::Bless.cue(), DrawCue::Success);
        assert_eq!(TokenKind::PlusOne.cue(), DrawCue::Success);
        assert_eq!(TokenKind::Skull.cue(), DrawCue::Neutral);
    }
}
