//! Engagement coordinator
//!
//! Toggles set-membership engagement fields (like/save/follow) optimistically
//! and reconciles them against the remote answer. Rapid repeated toggles on
//! the same field coalesce through the store's per-field generation counter:
//! a new toggle supersedes the in-flight one, and only the response matching
//! the current generation is applied. A rejected mutation rolls back
//! immediately on first rejection; retry policy, if wanted, layers above
//! this component.
//!
//! Completions always settle into the store, even when the screen that
//! issued the toggle is long gone - navigation never cancels an in-flight
//! engagement write.

use tracing::{debug, info, instrument, warn};

use feed_core::entities::{MembershipPatch, ProfileField, ReelField};
use feed_core::traits::RemoteError;
use feed_core::{EngagementProfile, EntityId, EntityKind, SyncError, SyncResult};

use crate::context::SyncContext;

/// Which engagement field a toggle targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementKind {
    /// Membership in a reel's `liked_by` set
    Like,
    /// Membership in the current user's `saved_reels` set
    Save,
    /// Membership in the current user's `following` set
    Follow,
}

impl EngagementKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Save => "save",
            Self::Follow => "follow",
        }
    }
}

impl std::fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimistic toggle of engagement set-membership with rollback
pub struct EngagementCoordinator {
    ctx: SyncContext,
}

impl EngagementCoordinator {
    #[must_use]
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Toggle one engagement field for the current user
    ///
    /// Reads the current effective membership (optimistic state included),
    /// applies the inverse locally, then issues the remote mutation. Returns
    /// the desired membership this call settled toward.
    #[instrument(skip(self))]
    pub async fn toggle(&self, entity_id: &EntityId, kind: EngagementKind) -> SyncResult<bool> {
        match kind {
            EngagementKind::Like => self.toggle_like(entity_id).await,
            EngagementKind::Save => {
                self.toggle_profile(entity_id, ProfileField::SavedReels(entity_id.clone()))
                    .await
            }
            EngagementKind::Follow => {
                self.toggle_profile(entity_id, ProfileField::Following(entity_id.clone()))
                    .await
            }
        }
    }

    /// Register one view of a reel
    ///
    /// View counts are plain counters owned by the remote; they are never
    /// mutated optimistically. The authoritative count arrives back through
    /// the live listener.
    #[instrument(skip(self))]
    pub async fn register_view(&self, reel_id: &EntityId) -> SyncResult<()> {
        match self.ctx.reel_remote().register_view(reel_id).await {
            Ok(()) => {
                debug!(reel_id = %reel_id, "view registered");
                Ok(())
            }
            Err(RemoteError::Missing) => Err(SyncError::NotFound {
                kind: EntityKind::Reel,
                id: reel_id.clone(),
            }),
            Err(err) if err.is_transport() => Err(SyncError::Transient(err.to_string())),
            Err(err) => Err(SyncError::Internal(err.to_string())),
        }
    }

    async fn toggle_like(&self, reel_id: &EntityId) -> SyncResult<bool> {
        self.ensure_reel_cached(reel_id).await?;

        let me = self.ctx.current_user().clone();
        let reel = self.ctx.reels().get(reel_id).ok_or_else(|| SyncError::NotFound {
            kind: EntityKind::Reel,
            id: reel_id.clone(),
        })?;
        let desired = !reel.is_liked_by(&me);

        let patch = MembershipPatch {
            member: me.clone(),
            present: desired,
        };
        let generation = self
            .ctx
            .reels()
            .upsert_optimistic(reel_id, ReelField::LikedBy, patch)
            .ok_or_else(|| SyncError::Internal("reel vanished during toggle".into()))?;

        let outcome = self
            .ctx
            .reel_remote()
            .set_like(reel_id, &me, desired)
            .await;

        match outcome {
            Ok(()) => {
                self.ctx.reels().confirm(reel_id, ReelField::LikedBy, generation);
                info!(reel_id = %reel_id, desired, "like toggle confirmed");
                Ok(desired)
            }
            Err(err) => {
                self.ctx.reels().rollback(reel_id, ReelField::LikedBy, generation);
                Err(classify_mutation_failure("like", EntityKind::Reel, reel_id, err))
            }
        }
    }

    async fn toggle_profile(&self, target_id: &EntityId, field: ProfileField) -> SyncResult<bool> {
        self.ensure_profile_cached().await?;

        let me = self.ctx.current_user().clone();
        let profile = self.ctx.profiles().get(&me).ok_or_else(|| {
            SyncError::Internal("engagement profile vanished during toggle".into())
        })?;

        let (desired, name, target_kind) = match &field {
            ProfileField::Following(_) => (
                !profile.is_following(target_id),
                "follow",
                EntityKind::Profile,
            ),
            ProfileField::SavedReels(_) => {
                (!profile.has_saved(target_id), "save", EntityKind::Reel)
            }
        };

        let patch = MembershipPatch {
            member: target_id.clone(),
            present: desired,
        };
        let generation = self
            .ctx
            .profiles()
            .upsert_optimistic(&me, field.clone(), patch)
            .ok_or_else(|| SyncError::Internal("engagement profile vanished during toggle".into()))?;

        let outcome = match &field {
            ProfileField::Following(_) => {
                self.ctx
                    .engagement_remote()
                    .set_follow(&me, target_id, desired)
                    .await
            }
            ProfileField::SavedReels(_) => {
                self.ctx
                    .engagement_remote()
                    .set_saved(&me, target_id, desired)
                    .await
            }
        };

        match outcome {
            Ok(()) => {
                self.ctx.profiles().confirm(&me, field, generation);
                info!(target_id = %target_id, field = name, desired, "engagement toggle confirmed");
                Ok(desired)
            }
            Err(err) => {
                self.ctx.profiles().rollback(&me, field, generation);
                Err(classify_mutation_failure(name, target_kind, target_id, err))
            }
        }
    }

    /// Fetch a reel into the store when it is not cached yet
    async fn ensure_reel_cached(&self, reel_id: &EntityId) -> SyncResult<()> {
        if self.ctx.reels().contains(reel_id) {
            return Ok(());
        }
        match self.ctx.reel_remote().fetch(reel_id).await {
            Ok(Some(reel)) => {
                self.ctx.reels().upsert_authoritative(reel);
                Ok(())
            }
            Ok(None) | Err(RemoteError::Missing) => Err(SyncError::NotFound {
                kind: EntityKind::Reel,
                id: reel_id.clone(),
            }),
            Err(err) if err.is_transport() => Err(SyncError::Transient(err.to_string())),
            Err(err) => Err(SyncError::Internal(err.to_string())),
        }
    }

    /// Fetch (or initialize) the current user's engagement profile
    async fn ensure_profile_cached(&self) -> SyncResult<()> {
        let me = self.ctx.current_user().clone();
        if self.ctx.profiles().contains(&me) {
            return Ok(());
        }
        match self.ctx.engagement_remote().fetch_profile(&me).await {
            Ok(Some(profile)) => {
                self.ctx.profiles().upsert_authoritative(profile);
                Ok(())
            }
            Ok(None) | Err(RemoteError::Missing) => {
                // No profile document yet; start from an empty one.
                self.ctx
                    .profiles()
                    .upsert_authoritative(EngagementProfile::new(me));
                Ok(())
            }
            Err(err) if err.is_transport() => Err(SyncError::Transient(err.to_string())),
            Err(err) => Err(SyncError::Internal(err.to_string())),
        }
    }
}

fn classify_mutation_failure(
    field: &str,
    kind: EntityKind,
    id: &EntityId,
    err: RemoteError,
) -> SyncError {
    match err {
        RemoteError::Rejected(reason) => {
            warn!(field, id = %id, reason = %reason, "optimistic mutation rejected, rolled back");
            SyncError::Rollback {
                field: field.to_string(),
                reason,
            }
        }
        RemoteError::Missing => SyncError::NotFound {
            kind,
            id: id.clone(),
        },
        err if err.is_transport() => {
            warn!(field, id = %id, "transport failure, optimistic mutation rolled back");
            SyncError::Transient(err.to_string())
        }
        err => SyncError::Internal(err.to_string()),
    }
}
