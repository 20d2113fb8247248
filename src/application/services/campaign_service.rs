//! Campaign Service - Application service driving the chaos bag session
//!
//! Owns the session behind a mutex so requests mutate it one at a time. Each
//! campaign change is written ahead locally while the lock is held, then the
//! remote sync is spawned and never awaited by the caller.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{Account, AuthError, IdentityPort, JournalEntry};
use crate::application::services::chaos_bag_session::{
    BagView, ChaosBagSession, DrawOutcome, SessionError,
};
use crate::application::services::persistence_gateway::PersistenceGateway;
use crate::domain::aggregates::{Campaign, CampaignSummary};
use crate::domain::entities::InvestigatorEdit;
use crate::domain::services::StatisticsReport;
use crate::domain::value_objects::{AccountId, CampaignId, TokenKind};

pub struct CampaignService {
    session: Mutex<ChaosBagSession>,
    gateway: Arc<PersistenceGateway>,
    identity: Arc<dyn IdentityPort>,
}

impl CampaignService {
    pub fn new(
        session: ChaosBagSession,
        gateway: Arc<PersistenceGateway>,
        identity: Arc<dyn IdentityPort>,
    ) -> Self {
        Self {
            session: Mutex::new(session),
            gateway,
            identity,
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    pub async fn current_account(&self) -> Option<Account> {
        self.identity.current_account().await
    }

    /// Sign up, then load the new account's campaigns
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Account, AuthError> {
        let account = self.identity.signup(email, password, display_name).await?;
        info!(account = %account.id, "Account created");
        self.reload().await;
        Ok(account)
    }

    /// Sign in, then load the account's campaigns
    ///
    /// The first load for an account moves any signed-out campaigns into it.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let account = self.identity.login(email, password).await?;
        info!(account = %account.id, "Signed in");
        self.reload().await;
        Ok(account)
    }

    /// Sign out and drop the account's campaigns from memory
    pub async fn logout(&self) {
        self.identity.logout().await;
        let mut session = self.session.lock().await;
        session.close_campaign();
        session.replace_campaigns(Vec::new());
        self.reload_into(&mut session).await;
    }

    /// Replace the cached campaign list with what the current owner has stored
    pub async fn reload(&self) {
        let mut session = self.session.lock().await;
        self.reload_into(&mut session).await;
    }

    /// The session stays locked across the load so no change lands in the
    /// list that is about to be replaced
    #[instrument(skip_all)]
    async fn reload_into(&self, session: &mut ChaosBagSession) {
        let owner = self.owner().await;
        let campaigns = self.gateway.load_all(owner.as_ref()).await;
        debug!(count = campaigns.len(), "Campaigns loaded");
        session.replace_campaigns(campaigns);
    }

    // ========================================================================
    // Working bag
    // ========================================================================

    pub async fn bag(&self) -> BagView {
        self.session.lock().await.view()
    }

    /// Draw one token, returning the bag as it stands right after the draw
    ///
    /// The outcome is `None` when the bag was empty.
    pub async fn draw(&self) -> (Option<DrawOutcome>, BagView) {
        let owner = self.owner().await;
        let mut session = self.session.lock().await;
        let outcome = session.draw();
        if let Some(campaign) = outcome.as_ref().and_then(|o| o.campaign.as_ref()) {
            self.commit(owner, upsert(campaign), session.campaigns()).await;
        }
        (outcome, session.view())
    }

    pub async fn return_all(&self) -> BagView {
        let mut session = self.session.lock().await;
        session.return_all();
        session.view()
    }

    pub async fn add_token(&self, kind: TokenKind) -> BagView {
        self.bag_edit(|session| session.add_token(kind)).await
    }

    pub async fn remove_token(&self, kind: TokenKind) -> BagView {
        self.bag_edit(|session| session.remove_token(kind)).await
    }

    pub async fn load_difficulty(&self, difficulty: String) -> BagView {
        self.bag_edit(move |session| session.load_difficulty(&difficulty))
            .await
    }

    pub async fn clear_bag(&self) -> BagView {
        self.bag_edit(|session| session.clear_bag()).await
    }

    async fn bag_edit(
        &self,
        f: impl FnOnce(&mut ChaosBagSession) -> Option<Campaign> + Send,
    ) -> BagView {
        let owner = self.owner().await;
        let mut session = self.session.lock().await;
        if let Some(campaign) = f(&mut *session) {
            self.commit(owner, upsert(&campaign), session.campaigns()).await;
        }
        session.view()
    }

    // ========================================================================
    // Campaigns
    // ========================================================================

    pub async fn list_campaigns(&self) -> Vec<CampaignSummary> {
        let session = self.session.lock().await;
        session.campaigns().iter().map(Campaign::summary).collect()
    }

    pub async fn get_campaign(&self, id: &CampaignId) -> Option<Campaign> {
        self.session.lock().await.find_campaign(id).cloned()
    }

    pub async fn active_campaign(&self) -> Option<Campaign> {
        self.session.lock().await.active_campaign().cloned()
    }

    #[instrument(skip(self))]
    pub async fn create_campaign(
        &self,
        name: &str,
        campaign_type: &str,
        difficulty: &str,
    ) -> Campaign {
        let owner = self.owner().await;
        let mut session = self.session.lock().await;
        let campaign = session.create_campaign(name, campaign_type, difficulty);
        info!(campaign = %campaign.id, "Campaign created");
        self.commit(owner, upsert(&campaign), session.campaigns()).await;
        campaign
    }

    pub async fn select_campaign(&self, id: &CampaignId) -> Result<Campaign, SessionError> {
        let mut session = self.session.lock().await;
        session.select_campaign(id).cloned()
    }

    pub async fn close_campaign(&self) {
        self.session.lock().await.close_campaign();
    }

    #[instrument(skip(self))]
    pub async fn delete_campaign(&self, id: &CampaignId) -> Result<(), SessionError> {
        let owner = self.owner().await;
        let mut session = self.session.lock().await;
        let removed = session.delete_campaign(id)?;
        info!(campaign = %removed.id, "Campaign deleted");
        let entry = JournalEntry::Delete { id: removed.id };
        self.commit(owner, entry, session.campaigns()).await;
        Ok(())
    }

    pub async fn statistics(&self) -> Result<StatisticsReport, SessionError> {
        let session = self.session.lock().await;
        let campaign = session
            .active_campaign()
            .ok_or(SessionError::NoActiveCampaign)?;
        Ok(StatisticsReport::from_statistics(&campaign.statistics))
    }

    pub async fn reset_statistics(&self) -> Result<Campaign, SessionError> {
        self.edit(|session| session.reset_statistics()).await
    }

    pub async fn toggle_scenario(&self, index: usize) -> Result<Campaign, SessionError> {
        self.edit(move |session| session.toggle_scenario(index)).await
    }

    pub async fn set_scenario_xp(&self, index: usize, xp: u32) -> Result<Campaign, SessionError> {
        self.edit(move |session| session.set_scenario_xp(index, xp))
            .await
    }

    pub async fn set_scenario_resolution(
        &self,
        index: usize,
        resolution: String,
    ) -> Result<Campaign, SessionError> {
        self.edit(move |session| session.set_scenario_resolution(index, &resolution))
            .await
    }

    pub async fn add_investigator(&self) -> Result<Campaign, SessionError> {
        self.edit(|session| session.add_investigator()).await
    }

    pub async fn edit_investigator(
        &self,
        index: usize,
        edit: InvestigatorEdit,
    ) -> Result<Campaign, SessionError> {
        self.edit(move |session| session.edit_investigator(index, edit))
            .await
    }

    pub async fn remove_investigator(&self, index: usize) -> Result<Campaign, SessionError> {
        self.edit(move |session| session.remove_investigator(index))
            .await
    }

    pub async fn set_notes(&self, notes: String) -> Result<Campaign, SessionError> {
        self.edit(move |session| session.set_notes(&notes)).await
    }

    /// Add a bag-modification note; blank text returns the campaign unchanged
    pub async fn add_modification(&self, text: String) -> Result<Campaign, SessionError> {
        let owner = self.owner().await;
        let mut session = self.session.lock().await;
        match session.add_modification(&text)? {
            Some(campaign) => {
                self.commit(owner, upsert(&campaign), session.campaigns()).await;
                Ok(campaign)
            }
            None => session
                .active_campaign()
                .cloned()
                .ok_or(SessionError::NoActiveCampaign),
        }
    }

    pub async fn remove_modification(&self, index: usize) -> Result<Campaign, SessionError> {
        self.edit(move |session| session.remove_modification(index))
            .await
    }

    async fn edit(
        &self,
        f: impl FnOnce(&mut ChaosBagSession) -> Result<Campaign, SessionError> + Send,
    ) -> Result<Campaign, SessionError> {
        let owner = self.owner().await;
        let mut session = self.session.lock().await;
        let campaign = f(&mut *session)?;
        self.commit(owner, upsert(&campaign), session.campaigns()).await;
        Ok(campaign)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    async fn owner(&self) -> Option<AccountId> {
        self.identity.current_account().await.map(|account| account.id)
    }

    /// Write the change ahead locally, then sync it in the background
    async fn commit(&self, owner: Option<AccountId>, entry: JournalEntry, snapshot: &[Campaign]) {
        self.gateway.write_ahead(owner.as_ref(), &entry, snapshot).await;

        if let Some(account) = owner {
            let gateway = Arc::clone(&self.gateway);
            tokio::spawn(async move {
                gateway.sync(&account, &entry).await;
            });
        }
    }
}

fn upsert(campaign: &Campaign) -> JournalEntry {
    JournalEntry::Upsert {
        campaign: campaign.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{
        CampaignRepositoryPort, LocalCampaignStorePort, LocalStoreError,
    };
    use crate::application::services::chaos_bag_session::tests::create_test_session;
    use crate::infrastructure::local_store::InMemoryCampaignStore;
    use crate::infrastructure::persistence::InMemoryCampaignRepository;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Identity provider with a single hard-coded account
    struct StubIdentity {
        current: StdMutex<Option<Account>>,
    }

    impl StubIdentity {
        fn new() -> Self {
            Self {
                current: StdMutex::new(None),
            }
        }

        fn account() -> Account {
            Account {
                id: AccountId::from("acct-1"),
                email: "keeper@example.com".to_string(),
                display_name: None,
                created_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl IdentityPort for StubIdentity {
        async fn current_account(&self) -> Option<Account> {
            self.current.lock().unwrap().clone()
        }

        async fn signup(
            &self,
            _email: &str,
            password: &str,
            _display_name: Option<&str>,
        ) -> Result<Account, AuthError> {
            if password.len() < 6 {
                return Err(AuthError::WeakPassword(6));
            }
            self.login("", password).await
        }

        async fn login(&self, _email: &str, password: &str) -> Result<Account, AuthError> {
            if password != "secret" {
                return Err(AuthError::WrongPassword);
            }
            let account = Self::account();
            *self.current.lock().unwrap() = Some(account.clone());
            Ok(account)
        }

        async fn logout(&self) {
            *self.current.lock().unwrap() = None;
        }
    }

    /// Local store whose fallback reads take a while
    struct SlowFallbackStore {
        inner: InMemoryCampaignStore,
    }

    #[async_trait]
    impl LocalCampaignStorePort for SlowFallbackStore {
        async fn read_fallback(&self) -> Result<Vec<Campaign>, LocalStoreError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            self.inner.read_fallback().await
        }

        async fn write_fallback(&self, campaigns: &[Campaign]) -> Result<(), LocalStoreError> {
            self.inner.write_fallback(campaigns).await
        }

        async fn clear_fallback(&self) -> Result<(), LocalStoreError> {
            self.inner.clear_fallback().await
        }

        async fn journal_put(
            &self,
            account: &AccountId,
            entry: &JournalEntry,
        ) -> Result<(), LocalStoreError> {
            self.inner.journal_put(account, entry).await
        }

        async fn journal_ack(
            &self,
            account: &AccountId,
            entry: &JournalEntry,
        ) -> Result<bool, LocalStoreError> {
            self.inner.journal_ack(account, entry).await
        }

        async fn journal_pending(
            &self,
            account: &AccountId,
        ) -> Result<Vec<JournalEntry>, LocalStoreError> {
            self.inner.journal_pending(account).await
        }
    }

    fn setup() -> (CampaignService, Arc<InMemoryCampaignStore>, Arc<InMemoryCampaignRepository>) {
        let local = Arc::new(InMemoryCampaignStore::new());
        let remote = Arc::new(InMemoryCampaignRepository::new());
        let gateway = Arc::new(PersistenceGateway::new(remote.clone(), local.clone()));
        let service = CampaignService::new(
            create_test_session(),
            gateway,
            Arc::new(StubIdentity::new()),
        );
        (service, local, remote)
    }

    #[tokio::test]
    async fn test_signed_out_changes_reach_fallback() {
        let (service, local, _) = setup();
        let campaign = service.create_campaign("Solo", "standalone", "easy").await;
        let (outcome, bag) = service.draw().await;
        assert!(outcome.is_some());
        assert_eq!(bag.drawn.len(), 1);

        let stored = local.read_fallback().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, campaign.id);
        assert_eq!(stored[0].statistics.total_draws, 1);

        service.delete_campaign(&campaign.id).await.unwrap();
        assert!(local.read_fallback().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_migrates_signed_out_campaigns() {
        let (service, local, remote) = setup();
        let campaign = service.create_campaign("Solo", "dunwich-legacy", "hard").await;

        service.login("keeper@example.com", "secret").await.unwrap();
        let listed = service.list_campaigns().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, campaign.id);
        assert!(local.read_fallback().await.unwrap().is_empty());

        let account = StubIdentity::account().id;
        assert_eq!(remote.load_all(&account).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_signed_in_changes_survive_reload() {
        let (service, _, _) = setup();
        service.login("keeper@example.com", "secret").await.unwrap();

        let campaign = service.create_campaign("Cloud", "standalone", "normal").await;
        service.set_notes("Remember the cultists".to_string()).await.unwrap();
        service.reload().await;

        let reloaded = service.get_campaign(&campaign.id).await.unwrap();
        assert_eq!(reloaded.notes, "Remember the cultists");
    }

    #[tokio::test]
    async fn test_logout_clears_account_campaigns() {
        let (service, _, _) = setup();
        service.login("keeper@example.com", "secret").await.unwrap();
        service.create_campaign("Cloud", "standalone", "normal").await;

        service.logout().await;
        assert!(service.list_campaigns().await.is_empty());
        assert!(service.active_campaign().await.is_none());
        assert_eq!(service.bag().await.bag_size, 0);
    }

    #[tokio::test]
    async fn test_create_during_reload_is_kept() {
        let local = Arc::new(SlowFallbackStore {
            inner: InMemoryCampaignStore::new(),
        });
        let remote = Arc::new(InMemoryCampaignRepository::new());
        let gateway = Arc::new(PersistenceGateway::new(remote, local.clone()));
        let service = Arc::new(CampaignService::new(
            create_test_session(),
            gateway,
            Arc::new(StubIdentity::new()),
        ));

        let reloading = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.reload().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fresh = service.create_campaign("Fresh", "standalone", "easy").await;
        reloading.await.unwrap();
        service.create_campaign("Later", "standalone", "easy").await;

        let listed = service.list_campaigns().await;
        assert!(listed.iter().any(|c| c.id == fresh.id));
        let stored = local.inner.read_fallback().await.unwrap();
        assert!(stored.iter().any(|c| c.id == fresh.id));
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_state() {
        let (service, _, _) = setup();
        service.create_campaign("Solo", "standalone", "easy").await;
        assert!(matches!(
            service.login("keeper@example.com", "nope").await,
            Err(AuthError::WrongPassword)
        ));
        assert_eq!(service.list_campaigns().await.len(), 1);
    }

    #[tokio::test]
    async fn test_statistics_require_active_campaign() {
        let (service, _, _) = setup();
        assert!(matches!(
            service.statistics().await,
            Err(SessionError::NoActiveCampaign)
        ));

        service.create_campaign("", "standalone", "easy").await;
        service.draw().await;
        let report = service.statistics().await.unwrap();
        assert_eq!(report.total_draws, 1);
    }

    #[tokio::test]
    async fn test_blank_modification_returns_campaign_unchanged() {
        let (service, local, _) = setup();
        service.create_campaign("", "standalone", "easy").await;
        let campaign = service.add_modification("  ".to_string()).await.unwrap();
        assert!(campaign.chaos_bag_modifications.is_empty());

        // Memory and the fallback list still agree
        let stored = local.read_fallback().await.unwrap();
        assert_eq!(stored, vec![campaign]);
    }

    #[tokio::test]
    async fn test_removing_absent_token_is_not_persisted() {
        let (service, local, _) = setup();
        service.create_campaign("", "standalone", "easy").await;
        service.draw().await;
        let stored = local.read_fallback().await.unwrap();

        let bag = service.remove_token(TokenKind::Frost).await;
        assert_eq!(bag.drawn.len(), 1);
        assert_eq!(bag.bag_size, 15);
        assert_eq!(local.read_fallback().await.unwrap(), stored);
    }
}
