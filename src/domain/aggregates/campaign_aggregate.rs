//! Campaign Aggregate - The root aggregate for one tracked campaign
//!
//! A campaign owns its bag configuration, scenario checklist, investigator
//! roster, draw statistics and notes. Mutators here only change fields; the
//! session controller is responsible for stamping `updated_at` and handing
//! the new revision to persistence.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Investigator, InvestigatorEdit, Scenario, Statistics};
use crate::domain::value_objects::{
    campaign_scenarios, difficulty_counts, find_campaign_template, CampaignId, TokenCounts,
    TokenKind,
};

const FALLBACK_CAMPAIGN_NAME: &str = "New Campaign";

/// The Campaign Aggregate Root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub campaign_type: String,
    pub difficulty: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub token_counts: TokenCounts,
    pub current_scenario_index: usize,
    pub scenarios: Vec<Scenario>,
    pub investigators: Vec<Investigator>,
    pub statistics: Statistics,
    pub notes: String,
    /// Free-text notes about permanent changes made to the bag
    pub chaos_bag_modifications: Vec<String>,
}

/// Compact listing entry for a campaign
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub id: CampaignId,
    pub name: String,
    pub campaign_type: String,
    pub difficulty: String,
    pub completed_scenarios: usize,
    pub total_scenarios: usize,
    pub investigators: usize,
    pub total_draws: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a campaign from a campaign-type template and difficulty preset
    ///
    /// A blank name falls back to the template's name. Unknown campaign types
    /// give an empty scenario list and unknown difficulties an empty bag.
    pub fn from_template(
        name: &str,
        campaign_type: &str,
        difficulty: &str,
        now: DateTime<Utc>,
    ) -> Self {
        // Stored documents keep millisecond timestamps
        let now = now.trunc_subsecs(3);
        let name = match name.trim() {
            "" => find_campaign_template(campaign_type)
                .map(|t| t.name)
                .unwrap_or(FALLBACK_CAMPAIGN_NAME)
                .to_string(),
            trimmed => trimmed.to_string(),
        };

        Self {
            id: CampaignId::new(),
            name,
            campaign_type: campaign_type.to_string(),
            difficulty: difficulty.to_string(),
            created_at: now,
            updated_at: now,
            token_counts: difficulty_counts(difficulty),
            current_scenario_index: 0,
            scenarios: campaign_scenarios(campaign_type)
                .iter()
                .map(|&n| Scenario::new(n))
                .collect(),
            investigators: Vec::new(),
            statistics: Statistics::new(),
            notes: String::new(),
            chaos_bag_modifications: Vec::new(),
        }
    }

    /// Stamp a new revision time, never earlier than creation
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.trunc_subsecs(3).max(self.created_at);
    }

    pub fn summary(&self) -> CampaignSummary {
        CampaignSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            campaign_type: self.campaign_type.clone(),
            difficulty: self.difficulty.clone(),
            completed_scenarios: self.scenarios.iter().filter(|s| s.completed).count(),
            total_scenarios: self.scenarios.len(),
            investigators: self.investigators.len(),
            total_draws: self.statistics.total_draws,
            updated_at: self.updated_at,
        }
    }

    // ========================================================================
    // Bag
    // ========================================================================

    pub fn set_token_counts(&mut self, counts: TokenCounts) {
        self.token_counts = counts;
    }

    /// Replace the bag with a difficulty preset
    pub fn apply_difficulty(&mut self, difficulty: &str) {
        self.difficulty = difficulty.to_string();
        self.token_counts = difficulty_counts(difficulty);
    }

    /// Record a draw against the current scenario
    pub fn record_draw(&mut self, token: TokenKind, at: DateTime<Utc>) {
        self.statistics
            .record(token, at.trunc_subsecs(3), self.current_scenario_index);
    }

    pub fn reset_statistics(&mut self) {
        self.statistics = Statistics::new();
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    /// Flip a scenario's completion and make it the current scenario
    pub fn toggle_scenario(&mut self, index: usize) -> Result<&Scenario, AggregateError> {
        let scenario = self.scenario_mut(index)?;
        scenario.toggle_completed();
        self.current_scenario_index = index;
        Ok(&self.scenarios[index])
    }

    pub fn set_scenario_xp(&mut self, index: usize, xp: u32) -> Result<(), AggregateError> {
        self.scenario_mut(index)?.xp_earned = xp;
        Ok(())
    }

    pub fn set_scenario_resolution(
        &mut self,
        index: usize,
        resolution: impl Into<String>,
    ) -> Result<(), AggregateError> {
        self.scenario_mut(index)?.set_resolution(resolution);
        Ok(())
    }

    fn scenario_mut(&mut self, index: usize) -> Result<&mut Scenario, AggregateError> {
        let len = self.scenarios.len();
        self.scenarios
            .get_mut(index)
            .ok_or(AggregateError::IndexOutOfRange {
                collection: "scenario",
                index,
                len,
            })
    }

    // ========================================================================
    // Investigators
    // ========================================================================

    pub fn add_investigator(&mut self, investigator: Investigator) {
        self.investigators.push(investigator);
    }

    pub fn edit_investigator(
        &mut self,
        index: usize,
        edit: InvestigatorEdit,
    ) -> Result<&Investigator, AggregateError> {
        let len = self.investigators.len();
        let investigator =
            self.investigators
                .get_mut(index)
                .ok_or(AggregateError::IndexOutOfRange {
                    collection: "investigator",
                    index,
                    len,
                })?;
        investigator.apply(edit);
        Ok(&*investigator)
    }

    pub fn remove_investigator(&mut self, index: usize) -> Result<Investigator, AggregateError> {
        if index >= self.investigators.len() {
            return Err(AggregateError::IndexOutOfRange {
                collection: "investigator",
                index,
                len: self.investigators.len(),
            });
        }
        Ok(self.investigators.remove(index))
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Append a bag-modification annotation; blank text is ignored
    pub fn add_modification(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.chaos_bag_modifications.push(text.to_string());
        true
    }

    pub fn remove_modification(&mut self, index: usize) -> Result<String, AggregateError> {
        if index >= self.chaos_bag_modifications.len() {
            return Err(AggregateError::IndexOutOfRange {
                collection: "modification",
                index,
                len: self.chaos_bag_modifications.len(),
            });
        }
        Ok(self.chaos_bag_modifications.remove(index))
    }
}

/// Errors that can occur when modifying the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// An index did not point at an existing element
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::IndexOutOfRange {
                collection,
                index,
                len,
            } => write!(
                f,
                "No {} at index {} (campaign has {})",
                collection, index, len
            ),
        }
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::InvestigatorClass;

    fn create_test_campaign() -> Campaign {
        Campaign::from_template("", "night-of-the-zealot", "easy", Utc::now())
    }

    #[test]
    fn test_from_template_seeds_everything() {
        let campaign = create_test_campaign();

        assert_eq!(campaign.name, "The Night of the Zealot");
        assert_eq!(campaign.token_counts, difficulty_counts("easy"));
        assert_eq!(campaign.scenarios.len(), 3);
        assert!(campaign
            .scenarios
            .iter()
            .all(|s| !s.completed && s.xp_earned == 0));
        assert_eq!(campaign.scenarios[1].name, "The Midnight Masks");
        assert_eq!(campaign.statistics, Statistics::new());
        assert!(campaign.investigators.is_empty());
        assert!(campaign.notes.is_empty());
        assert!(campaign.chaos_bag_modifications.is_empty());
        assert_eq!(campaign.created_at, campaign.updated_at);
    }

    #[test]
    fn test_from_template_unknown_keys_degrade() {
        let campaign = Campaign::from_template("My run", "homebrew", "impossible", Utc::now());
        assert_eq!(campaign.name, "My run");
        assert!(campaign.scenarios.is_empty());
        assert!(campaign.token_counts.is_empty());

        let unnamed = Campaign::from_template("  ", "homebrew", "easy", Utc::now());
        assert_eq!(unnamed.name, "New Campaign");
    }

    #[test]
    fn test_toggle_scenario_sets_current_index() {
        let mut campaign = create_test_campaign();

        campaign.toggle_scenario(2).unwrap();
        assert!(campaign.scenarios[2].completed);
        assert_eq!(campaign.current_scenario_index, 2);

        campaign.toggle_scenario(2).unwrap();
        assert!(!campaign.scenarios[2].completed);
        assert_eq!(campaign.current_scenario_index, 2);

        assert!(campaign.toggle_scenario(3).is_err());
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let mut campaign = create_test_campaign();
        let earlier = campaign.created_at - chrono::Duration::seconds(5);
        campaign.touch(earlier);
        assert_eq!(campaign.updated_at, campaign.created_at);
    }

    #[test]
    fn test_record_draw_uses_current_scenario() {
        let mut campaign = create_test_campaign();
        campaign.toggle_scenario(1).unwrap();
        campaign.record_draw(TokenKind::Cultist, Utc::now());
        assert_eq!(campaign.statistics.draw_history[0].scenario_index, 1);
    }

    #[test]
    fn test_investigator_roster() {
        let mut campaign = create_test_campaign();
        campaign.add_investigator(Investigator::default());
        campaign.add_investigator(Investigator::new("Agnes Baker", InvestigatorClass::Mystic));

        let edited = campaign
            .edit_investigator(0, InvestigatorEdit::AdjustHealth(-2))
            .unwrap();
        assert_eq!(edited.current_health, 5);

        let removed = campaign.remove_investigator(0).unwrap();
        assert_eq!(removed.name, "Investigator");
        assert_eq!(campaign.investigators.len(), 1);
        assert!(campaign.remove_investigator(5).is_err());
    }

    #[test]
    fn test_modifications_ignore_blank_text() {
        let mut campaign = create_test_campaign();
        assert!(!campaign.add_modification("   "));
        assert!(campaign.add_modification("  Added a -3 token after The Gathering "));
        assert_eq!(
            campaign.chaos_bag_modifications,
            vec!["Added a -3 token after The Gathering".to_string()]
        );
        assert_eq!(
            campaign.remove_modification(0).unwrap(),
            "Added a -3 token after The Gathering"
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut campaign = create_test_campaign();
        campaign.toggle_scenario(0).unwrap();
        campaign.add_investigator(Investigator::default());
        campaign.record_draw(TokenKind::Zero, Utc::now());

        let summary = campaign.summary();
        assert_eq!(summary.completed_scenarios, 1);
        assert_eq!(summary.total_scenarios, 3);
        assert_eq!(summary.investigators, 1);
        assert_eq!(summary.total_draws, 1);
    }
}
