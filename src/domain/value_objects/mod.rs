//! Value objects - Immutable objects defined by their attributes

mod ids;
mod presets;
mod token;
mod token_counts;

pub use ids::*;
pub use presets::{
    campaign_scenarios, difficulty_counts, find_campaign_template,
    CampaignTemplate, DifficultyPreset, CAMPAIGN_TEMPLATES, DIFFICULTY_PRESETS,
};
pub use token::{DrawCue, Token, TokenClass, TokenKind, CATALOG};
pub use token_counts::TokenCounts;
