//! Sync context - dependency container for the sync components
//!
//! Holds the remote gateways, the content stores, the configuration, and the
//! current user identity. Components receive an explicit context instead of
//! reaching for globals, so tests build isolated instances freely.

use std::sync::Arc;

use feed_common::SyncConfig;
use feed_core::entities::{EngagementProfile, Notification, Reel, Status};
use feed_core::traits::{
    AvailabilityRemote, EngagementRemote, LiveRemote, NotificationRemote, ReelRemote, StatusRemote,
};
use feed_core::{EntityId, SyncError, SyncResult};

use crate::store::ContentStore;

/// Dependency container for the sync core
#[derive(Clone)]
pub struct SyncContext {
    config: SyncConfig,
    current_user: EntityId,

    // Remote gateways
    reel_remote: Arc<dyn ReelRemote>,
    status_remote: Arc<dyn StatusRemote>,
    notification_remote: Arc<dyn NotificationRemote>,
    engagement_remote: Arc<dyn EngagementRemote>,
    live_remote: Arc<dyn LiveRemote>,
    availability_remote: Arc<dyn AvailabilityRemote>,

    // Content stores (single source of truth for consumers)
    reels: Arc<ContentStore<Reel>>,
    statuses: Arc<ContentStore<Status>>,
    notifications: Arc<ContentStore<Notification>>,
    profiles: Arc<ContentStore<EngagementProfile>>,
}

impl SyncContext {
    /// Start building a context
    #[must_use]
    pub fn builder() -> SyncContextBuilder {
        SyncContextBuilder::new()
    }

    /// Configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The signed-in user this client reconciles for
    pub fn current_user(&self) -> &EntityId {
        &self.current_user
    }

    // === Remote gateways ===

    pub fn reel_remote(&self) -> &dyn ReelRemote {
        self.reel_remote.as_ref()
    }

    pub fn status_remote(&self) -> &dyn StatusRemote {
        self.status_remote.as_ref()
    }

    pub fn notification_remote(&self) -> &dyn NotificationRemote {
        self.notification_remote.as_ref()
    }

    pub fn engagement_remote(&self) -> &dyn EngagementRemote {
        self.engagement_remote.as_ref()
    }

    pub fn live_remote(&self) -> &dyn LiveRemote {
        self.live_remote.as_ref()
    }

    pub fn availability_remote(&self) -> &dyn AvailabilityRemote {
        self.availability_remote.as_ref()
    }

    // === Stores ===

    pub fn reels(&self) -> &ContentStore<Reel> {
        &self.reels
    }

    pub fn statuses(&self) -> &ContentStore<Status> {
        &self.statuses
    }

    pub fn notifications(&self) -> &ContentStore<Notification> {
        &self.notifications
    }

    pub fn profiles(&self) -> &ContentStore<EngagementProfile> {
        &self.profiles
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("current_user", &self.current_user)
            .field("reels", &self.reels.len())
            .field("statuses", &self.statuses.len())
            .field("notifications", &self.notifications.len())
            .finish()
    }
}

/// Builder for [`SyncContext`]
#[derive(Default)]
pub struct SyncContextBuilder {
    config: Option<SyncConfig>,
    current_user: Option<EntityId>,
    reel_remote: Option<Arc<dyn ReelRemote>>,
    status_remote: Option<Arc<dyn StatusRemote>>,
    notification_remote: Option<Arc<dyn NotificationRemote>>,
    engagement_remote: Option<Arc<dyn EngagementRemote>>,
    live_remote: Option<Arc<dyn LiveRemote>>,
    availability_remote: Option<Arc<dyn AvailabilityRemote>>,
}

impl SyncContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn current_user(mut self, user_id: EntityId) -> Self {
        self.current_user = Some(user_id);
        self
    }

    pub fn reel_remote(mut self, remote: Arc<dyn ReelRemote>) -> Self {
        self.reel_remote = Some(remote);
        self
    }

    pub fn status_remote(mut self, remote: Arc<dyn StatusRemote>) -> Self {
        self.status_remote = Some(remote);
        self
    }

    pub fn notification_remote(mut self, remote: Arc<dyn NotificationRemote>) -> Self {
        self.notification_remote = Some(remote);
        self
    }

    pub fn engagement_remote(mut self, remote: Arc<dyn EngagementRemote>) -> Self {
        self.engagement_remote = Some(remote);
        self
    }

    pub fn live_remote(mut self, remote: Arc<dyn LiveRemote>) -> Self {
        self.live_remote = Some(remote);
        self
    }

    pub fn availability_remote(mut self, remote: Arc<dyn AvailabilityRemote>) -> Self {
        self.availability_remote = Some(remote);
        self
    }

    /// Build the context
    ///
    /// # Errors
    /// Returns `SyncError::Internal` if any required dependency is missing.
    pub fn build(self) -> SyncResult<SyncContext> {
        let config = self.config.unwrap_or_default();
        let buffer = config.subscription_buffer;

        Ok(SyncContext {
            current_user: self
                .current_user
                .ok_or_else(|| missing("current_user"))?,
            reel_remote: self.reel_remote.ok_or_else(|| missing("reel_remote"))?,
            status_remote: self.status_remote.ok_or_else(|| missing("status_remote"))?,
            notification_remote: self
                .notification_remote
                .ok_or_else(|| missing("notification_remote"))?,
            engagement_remote: self
                .engagement_remote
                .ok_or_else(|| missing("engagement_remote"))?,
            live_remote: self.live_remote.ok_or_else(|| missing("live_remote"))?,
            availability_remote: self
                .availability_remote
                .ok_or_else(|| missing("availability_remote"))?,
            reels: Arc::new(ContentStore::new(buffer)),
            statuses: Arc::new(ContentStore::new(buffer)),
            notifications: Arc::new(ContentStore::new(buffer)),
            profiles: Arc::new(ContentStore::new(buffer)),
            config,
        })
    }
}

fn missing(dependency: &str) -> SyncError {
    SyncError::Internal(format!("{dependency} is required"))
}
