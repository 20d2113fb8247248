//! Chaos bag session - The single owner of interactive state
//!
//! The session holds the cached campaign list, which campaign is active, the
//! working token counts, the drawable bag, and the transient drawn list. All
//! mutations are synchronous and in-memory; every operation that changes a
//! campaign returns the new revision so the caller can hand it to persistence.

use std::sync::Arc;

use rand::RngCore;
use serde::Serialize;

use crate::application::ports::outbound::ClockPort;
use crate::domain::aggregates::{AggregateError, Campaign};
use crate::domain::entities::{Investigator, InvestigatorEdit};
use crate::domain::services::Bag;
use crate::domain::value_objects::{difficulty_counts, CampaignId, TokenCounts, TokenKind};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No campaign is active")]
    NoActiveCampaign,
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Result of a successful draw
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub token: TokenKind,
    /// Tokens left in the bag after the draw
    pub remaining: usize,
    /// The active campaign with the draw recorded, if a campaign is active
    pub campaign: Option<Campaign>,
}

/// Snapshot of the working bag for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BagView {
    pub active_campaign_id: Option<CampaignId>,
    pub token_counts: TokenCounts,
    pub bag_size: usize,
    /// What is still in the bag, per token
    pub remaining: TokenCounts,
    pub drawn: Vec<TokenKind>,
    pub last_drawn: Option<TokenKind>,
}

pub struct ChaosBagSession {
    clock: Arc<dyn ClockPort>,
    rng: Box<dyn RngCore + Send>,
    campaigns: Vec<Campaign>,
    active: Option<CampaignId>,
    counts: TokenCounts,
    bag: Bag,
    drawn: Vec<TokenKind>,
    last_drawn: Option<TokenKind>,
}

impl ChaosBagSession {
    pub fn new(clock: Arc<dyn ClockPort>, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            clock,
            rng,
            campaigns: Vec::new(),
            active: None,
            counts: TokenCounts::empty(),
            bag: Bag::default(),
            drawn: Vec::new(),
            last_drawn: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn find_campaign(&self, id: &CampaignId) -> Option<&Campaign> {
        self.campaigns.iter().find(|c| &c.id == id)
    }

    pub fn active_campaign(&self) -> Option<&Campaign> {
        self.active.as_ref().and_then(|id| self.find_campaign(id))
    }

    pub fn counts(&self) -> &TokenCounts {
        &self.counts
    }

    pub fn bag(&self) -> &Bag {
        &self.bag
    }

    pub fn drawn(&self) -> &[TokenKind] {
        &self.drawn
    }

    pub fn last_drawn(&self) -> Option<TokenKind> {
        self.last_drawn
    }

    pub fn view(&self) -> BagView {
        BagView {
            active_campaign_id: self.active.clone(),
            token_counts: self.counts,
            bag_size: self.bag.len(),
            remaining: self.bag.counts(),
            drawn: self.drawn.clone(),
            last_drawn: self.last_drawn,
        }
    }

    // ========================================================================
    // Working bag
    // ========================================================================

    /// Add one token to the bag
    pub fn add_token(&mut self, kind: TokenKind) -> Option<Campaign> {
        let mut counts = self.counts;
        counts.increment(kind);
        self.set_counts(counts)
    }

    /// Remove one token from the bag; removing an absent token changes nothing
    pub fn remove_token(&mut self, kind: TokenKind) -> Option<Campaign> {
        let mut counts = self.counts;
        counts.decrement(kind);
        self.set_counts(counts)
    }

    /// Draw one token at random
    ///
    /// Returns `None` when the bag is empty; nothing changes in that case.
    pub fn draw(&mut self) -> Option<DrawOutcome> {
        let token = self.bag.draw(&mut *self.rng)?;
        self.drawn.push(token);
        self.last_drawn = Some(token);

        let now = self.clock.now();
        let campaign = self
            .mutate_active(|campaign| {
                campaign.record_draw(token, now);
                Ok(())
            })
            .ok()
            .map(|((), campaign)| campaign);

        Some(DrawOutcome {
            token,
            remaining: self.bag.len(),
            campaign,
        })
    }

    /// Put every drawn token back into the bag
    pub fn return_all(&mut self) {
        let drawn = std::mem::take(&mut self.drawn);
        self.bag.return_all(drawn);
        self.last_drawn = None;
    }

    /// Replace the bag with a difficulty preset
    ///
    /// This is destructive: custom counts are discarded and the drawn list and
    /// last draw are cleared.
    pub fn load_difficulty(&mut self, difficulty: &str) -> Option<Campaign> {
        self.reset_working(difficulty_counts(difficulty));
        self.mutate_active(|campaign| {
            campaign.apply_difficulty(difficulty);
            Ok(())
        })
        .ok()
        .map(|((), campaign)| campaign)
    }

    /// Empty the bag
    pub fn clear_bag(&mut self) -> Option<Campaign> {
        self.reset_working(TokenCounts::empty());
        self.mutate_active(|campaign| {
            campaign.set_token_counts(TokenCounts::empty());
            Ok(())
        })
        .ok()
        .map(|((), campaign)| campaign)
    }

    fn set_counts(&mut self, counts: TokenCounts) -> Option<Campaign> {
        if counts == self.counts {
            return None;
        }

        // The bag is rebuilt from the new counts, so drawn tokens are back in it
        self.counts = counts;
        self.bag = Bag::from_counts(&counts);
        self.drawn.clear();

        self.mutate_active(|campaign| {
            campaign.set_token_counts(counts);
            Ok(())
        })
        .ok()
        .map(|((), campaign)| campaign)
    }

    fn reset_working(&mut self, counts: TokenCounts) {
        self.counts = counts;
        self.bag = Bag::from_counts(&counts);
        self.drawn.clear();
        self.last_drawn = None;
    }

    // ========================================================================
    // Campaign management
    // ========================================================================

    /// Create a campaign from a template and make it active
    pub fn create_campaign(&mut self, name: &str, campaign_type: &str, difficulty: &str) -> Campaign {
        let campaign = Campaign::from_template(name, campaign_type, difficulty, self.clock.now());
        self.campaigns.push(campaign.clone());
        self.activate(&campaign);
        campaign
    }

    /// Make a campaign active and load its bag
    pub fn select_campaign(&mut self, id: &CampaignId) -> Result<&Campaign, SessionError> {
        let campaign = self
            .find_campaign(id)
            .cloned()
            .ok_or_else(|| SessionError::CampaignNotFound(id.clone()))?;
        self.activate(&campaign);
        self.active_campaign().ok_or(SessionError::NoActiveCampaign)
    }

    /// Deactivate the current campaign and empty the working bag
    pub fn close_campaign(&mut self) {
        self.active = None;
        self.reset_working(TokenCounts::empty());
    }

    /// Remove a campaign from the list, deactivating it if it was active
    pub fn delete_campaign(&mut self, id: &CampaignId) -> Result<Campaign, SessionError> {
        let position = self
            .campaigns
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| SessionError::CampaignNotFound(id.clone()))?;
        let removed = self.campaigns.remove(position);

        if self.active.as_ref() == Some(id) {
            self.close_campaign();
        }
        Ok(removed)
    }

    /// Replace the cached campaign list with a freshly loaded one
    ///
    /// The active campaign stays active if the new list still has it.
    pub fn replace_campaigns(&mut self, campaigns: Vec<Campaign>) {
        self.campaigns = campaigns;
        let still_present = self
            .active
            .as_ref()
            .is_some_and(|id| self.campaigns.iter().any(|c| &c.id == id));
        if !still_present && self.active.is_some() {
            self.close_campaign();
        }
    }

    fn activate(&mut self, campaign: &Campaign) {
        self.active = Some(campaign.id.clone());
        self.reset_working(campaign.token_counts);
    }

    // ========================================================================
    // Active campaign edits
    // ========================================================================

    /// Flip a scenario's completion; it also becomes the current scenario
    pub fn toggle_scenario(&mut self, index: usize) -> Result<Campaign, SessionError> {
        self.edit_active(|c| c.toggle_scenario(index).map(|_| ()))
    }

    pub fn set_scenario_xp(&mut self, index: usize, xp: u32) -> Result<Campaign, SessionError> {
        self.edit_active(|c| c.set_scenario_xp(index, xp))
    }

    pub fn set_scenario_resolution(
        &mut self,
        index: usize,
        resolution: &str,
    ) -> Result<Campaign, SessionError> {
        self.edit_active(|c| c.set_scenario_resolution(index, resolution))
    }

    pub fn add_investigator(&mut self) -> Result<Campaign, SessionError> {
        self.edit_active(|c| {
            c.add_investigator(Investigator::default());
            Ok(())
        })
    }

    pub fn edit_investigator(
        &mut self,
        index: usize,
        edit: InvestigatorEdit,
    ) -> Result<Campaign, SessionError> {
        self.edit_active(|c| c.edit_investigator(index, edit).map(|_| ()))
    }

    pub fn remove_investigator(&mut self, index: usize) -> Result<Campaign, SessionError> {
        self.edit_active(|c| c.remove_investigator(index).map(|_| ()))
    }

    pub fn set_notes(&mut self, notes: &str) -> Result<Campaign, SessionError> {
        self.edit_active(|c| {
            c.set_notes(notes);
            Ok(())
        })
    }

    /// Add a bag-modification note; blank text leaves the campaign untouched
    pub fn add_modification(&mut self, text: &str) -> Result<Option<Campaign>, SessionError> {
        self.mutate_active_if(|c| Ok(c.add_modification(text)))
    }

    pub fn remove_modification(&mut self, index: usize) -> Result<Campaign, SessionError> {
        self.edit_active(|c| c.remove_modification(index).map(|_| ()))
    }

    pub fn reset_statistics(&mut self) -> Result<Campaign, SessionError> {
        self.edit_active(|c| {
            c.reset_statistics();
            Ok(())
        })
    }

    fn edit_active(
        &mut self,
        f: impl FnOnce(&mut Campaign) -> Result<(), AggregateError>,
    ) -> Result<Campaign, SessionError> {
        self.mutate_active(f).map(|((), campaign)| campaign)
    }

    /// Like `mutate_active`, but the change reports whether it did anything
    ///
    /// A change that reports `false` leaves the stored campaign and its stamp
    /// untouched and yields `None`.
    fn mutate_active_if(
        &mut self,
        f: impl FnOnce(&mut Campaign) -> Result<bool, AggregateError>,
    ) -> Result<Option<Campaign>, SessionError> {
        let position = self.active_position()?;
        let mut next = self.campaigns[position].clone();
        if !f(&mut next)? {
            return Ok(None);
        }
        Ok(Some(self.store_at(position, next)))
    }

    /// Apply a change to a copy of the active campaign, stamp it, and store it
    ///
    /// Nothing is stored if the change fails.
    fn mutate_active<T>(
        &mut self,
        f: impl FnOnce(&mut Campaign) -> Result<T, AggregateError>,
    ) -> Result<(T, Campaign), SessionError> {
        let position = self.active_position()?;
        let mut next = self.campaigns[position].clone();
        let output = f(&mut next)?;
        Ok((output, self.store_at(position, next)))
    }

    fn active_position(&self) -> Result<usize, SessionError> {
        let id = self.active.as_ref().ok_or(SessionError::NoActiveCampaign)?;
        self.campaigns
            .iter()
            .position(|c| &c.id == id)
            .ok_or(SessionError::NoActiveCampaign)
    }

    fn store_at(&mut self, position: usize, mut campaign: Campaign) -> Campaign {
        campaign.touch(self.clock.now());
        self.campaigns[position] = campaign.clone();
        campaign
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Clock that advances one millisecond per reading
    pub(crate) struct SteppingClock(Mutex<DateTime<Utc>>);

    impl SteppingClock {
        pub(crate) fn new() -> Self {
            Self(Mutex::new(Utc::now()))
        }
    }

    impl ClockPort for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut now = self.0.lock().unwrap();
            *now += Duration::milliseconds(1);
            *now
        }
    }

    pub(crate) fn create_test_session() -> ChaosBagSession {
        ChaosBagSession::new(
            Arc::new(SteppingClock::new()),
            Box::new(StdRng::seed_from_u64(1234)),
        )
    }

    #[test]
    fn test_draws_without_campaign_touch_only_working_state() {
        let mut session = create_test_session();
        assert!(session.draw().is_none());

        session.load_difficulty("easy");
        let outcome = session.draw().unwrap();
        assert_eq!(outcome.remaining, 15);
        assert!(outcome.campaign.is_none());
        assert_eq!(session.drawn(), &[outcome.token]);
        assert_eq!(session.last_drawn(), Some(outcome.token));
    }

    #[test]
    fn test_statistics_track_every_draw() {
        let mut session = create_test_session();
        session.create_campaign("", "dunwich-legacy", "normal");

        let mut n = 0;
        while let Some(outcome) = session.draw() {
            n += 1;
            let stats = &outcome.campaign.unwrap().statistics;
            assert_eq!(stats.total_draws, n);
        }

        let stats = &session.active_campaign().unwrap().statistics;
        assert_eq!(n as usize, difficulty_counts("normal").total());
        assert_eq!(stats.total_draws, n);
        assert_eq!(stats.token_draws.values().sum::<u64>(), n);
        assert_eq!(stats.draw_history.len() as u64, n);
        assert!(session.bag().is_empty());
    }

    #[test]
    fn test_draw_records_current_scenario() {
        let mut session = create_test_session();
        session.create_campaign("", "night-of-the-zealot", "easy");
        session.toggle_scenario(1).unwrap();
        let outcome = session.draw().unwrap();
        let record = outcome.campaign.unwrap().statistics.draw_history[0];
        assert_eq!(record.scenario_index, 1);
        assert_eq!(record.token_id, outcome.token);
    }

    #[test]
    fn test_return_all_restores_bag() {
        let mut session = create_test_session();
        session.load_difficulty("hard");
        for _ in 0..5 {
            session.draw();
        }
        session.return_all();
        assert_eq!(session.bag().len(), session.counts().total());
        assert_eq!(session.bag().counts(), *session.counts());
        assert!(session.drawn().is_empty());
        assert_eq!(session.last_drawn(), None);
    }

    #[test]
    fn test_token_edits_rebuild_bag_and_persist() {
        let mut session = create_test_session();
        let created = session.create_campaign("Solo", "standalone", "easy");
        session.draw();

        let updated = session.add_token(TokenKind::Frost).unwrap();
        assert_eq!(updated.token_counts.get(TokenKind::Frost), 1);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(session.bag().len(), 17);
        assert!(session.drawn().is_empty());

        let updated = session.remove_token(TokenKind::Frost).unwrap();
        assert_eq!(updated.token_counts.get(TokenKind::Frost), 0);
    }

    #[test]
    fn test_removing_absent_token_keeps_bag_and_draws() {
        let mut session = create_test_session();
        session.create_campaign("Solo", "standalone", "easy");
        for _ in 0..3 {
            session.draw();
        }
        let before = session.active_campaign().unwrap().clone();
        let drawn = session.drawn().to_vec();

        assert!(session.remove_token(TokenKind::Frost).is_none());
        assert_eq!(session.drawn(), drawn.as_slice());
        assert_eq!(session.bag().len(), 13);
        assert_eq!(session.active_campaign().unwrap(), &before);
    }

    #[test]
    fn test_load_difficulty_replaces_counts() {
        let mut session = create_test_session();
        session.create_campaign("", "standalone", "easy");
        session.add_token(TokenKind::Curse);
        session.add_token(TokenKind::MinusSeven);
        session.draw();

        let updated = session.load_difficulty("expert").unwrap();
        assert_eq!(updated.token_counts, difficulty_counts("expert"));
        assert_eq!(updated.difficulty, "expert");
        assert_eq!(updated.token_counts.get(TokenKind::Curse), 0);
        assert_eq!(updated.token_counts.get(TokenKind::MinusSeven), 0);
        assert!(session.drawn().is_empty());
        assert_eq!(session.last_drawn(), None);
        assert_eq!(*session.counts(), difficulty_counts("expert"));
    }

    #[test]
    fn test_toggle_scenario_twice() {
        let mut session = create_test_session();
        session.create_campaign("", "path-to-carcosa", "normal");

        let campaign = session.toggle_scenario(4).unwrap();
        assert!(campaign.scenarios[4].completed);
        assert_eq!(campaign.current_scenario_index, 4);

        let campaign = session.toggle_scenario(4).unwrap();
        assert!(!campaign.scenarios[4].completed);
        assert_eq!(campaign.current_scenario_index, 4);

        assert!(matches!(
            session.toggle_scenario(8),
            Err(SessionError::Aggregate(AggregateError::IndexOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_select_hydrates_and_clears_transient_state() {
        let mut session = create_test_session();
        let first = session.create_campaign("First", "standalone", "easy");
        session.create_campaign("Second", "standalone", "expert");
        session.draw();

        session.select_campaign(&first.id).unwrap();
        assert_eq!(*session.counts(), difficulty_counts("easy"));
        assert_eq!(session.bag().len(), 16);
        assert!(session.drawn().is_empty());
        assert_eq!(session.last_drawn(), None);

        assert!(matches!(
            session.select_campaign(&CampaignId::from("missing")),
            Err(SessionError::CampaignNotFound(_))
        ));
    }

    #[test]
    fn test_delete_active_campaign_resets_working_state() {
        let mut session = create_test_session();
        let keep = session.create_campaign("Keep", "standalone", "normal");
        let doomed = session.create_campaign("Doomed", "standalone", "hard");

        session.delete_campaign(&doomed.id).unwrap();
        assert_eq!(session.campaigns().len(), 1);
        assert_eq!(session.campaigns()[0].id, keep.id);
        assert!(session.active_campaign().is_none());
        assert_eq!(*session.counts(), TokenCounts::empty());
        assert!(session.bag().is_empty());
    }

    #[test]
    fn test_delete_inactive_campaign_keeps_active() {
        let mut session = create_test_session();
        let other = session.create_campaign("Other", "standalone", "normal");
        let active = session.create_campaign("Active", "standalone", "easy");

        session.delete_campaign(&other.id).unwrap();
        assert_eq!(session.active_campaign().unwrap().id, active.id);
        assert_eq!(*session.counts(), difficulty_counts("easy"));
    }

    #[test]
    fn test_campaign_edits_require_active_campaign() {
        let mut session = create_test_session();
        assert!(matches!(
            session.set_notes("hello"),
            Err(SessionError::NoActiveCampaign)
        ));
        assert!(session.add_token(TokenKind::Skull).is_none());
        assert_eq!(session.counts().get(TokenKind::Skull), 1);
    }

    #[test]
    fn test_blank_modification_is_not_persisted() {
        let mut session = create_test_session();
        session.create_campaign("", "standalone", "easy");
        let before = session.active_campaign().unwrap().updated_at;

        assert!(session.add_modification("   ").unwrap().is_none());
        assert!(session.active_campaign().unwrap().chaos_bag_modifications.is_empty());
        assert_eq!(session.active_campaign().unwrap().updated_at, before);

        let campaign = session.add_modification("Added a curse").unwrap().unwrap();
        assert_eq!(campaign.chaos_bag_modifications, vec!["Added a curse".to_string()]);
    }

    #[test]
    fn test_replace_campaigns_drops_missing_active() {
        let mut session = create_test_session();
        session.create_campaign("", "standalone", "easy");
        session.replace_campaigns(Vec::new());
        assert!(session.active_campaign().is_none());
        assert!(session.bag().is_empty());
    }

    #[test]
    fn test_reset_statistics() {
        let mut session = create_test_session();
        session.create_campaign("", "standalone", "easy");
        session.draw();
        session.draw();
        let campaign = session.reset_statistics().unwrap();
        assert_eq!(campaign.statistics.total_draws, 0);
        assert!(campaign.statistics.draw_history.is_empty());
    }
}
