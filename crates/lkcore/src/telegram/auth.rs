//! Authorization sequence
//!
//! ```text
//! Idle ─► Loading ─┬─► CacheHit ───────────────────────► Done
//!                  └─► NetworkPending ─┬─► Resolved ─────► Done
//!                                      └─► Failed ───────► Done
//! ```
//!
//! Without a user id the sequence goes straight to `Done` and the loading
//! indicator is never shown. Every other path holds a [`LoadingGuard`]
//! until `Done`, and the completion callback runs exactly once on every
//! path, panics included. Steps run strictly in order: the webhook is not
//! called before the cache check finishes and the callback does not run
//! before the pacing delay has elapsed.
//!
//! [`LoadingGuard`]: super::view::LoadingGuard

use futures_util::FutureExt;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use super::api::AuthService;
use super::types::TelegramUser;
use super::view::ViewBinding;
use crate::core::{config, AppError};
use crate::profile::{value_to_string, ProfileRecord};
use crate::storage::ProfileCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    Loading,
    CacheHit,
    NetworkPending,
    Resolved,
    Failed,
    Done,
}

/// Which branch the sequence took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// No user id, nothing was attempted
    Skipped,
    /// Profile came from the cache
    CacheHit,
    /// Profile came from the webhook and was cached
    Resolved,
    /// No webhook client configured
    ServiceUnavailable,
    /// Webhook answered without a matching record
    NotFound,
    /// Webhook call failed or the sequence panicked
    Failed,
}

impl AuthOutcome {
    pub fn is_authorized(self) -> bool {
        matches!(self, AuthOutcome::CacheHit | AuthOutcome::Resolved)
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Pause before `Done` on every branch except cache hit
    pub pacing_delay: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pacing_delay: config::auth::pacing_delay(),
        }
    }
}

impl AuthConfig {
    /// No pacing, for tests and scripted runs
    pub fn immediate() -> Self {
        Self {
            pacing_delay: Duration::ZERO,
        }
    }
}

pub struct AuthOrchestrator {
    service: Option<Arc<dyn AuthService>>,
    cache: ProfileCache,
    view: ViewBinding,
    config: AuthConfig,
}

impl AuthOrchestrator {
    pub fn new(
        service: Option<Arc<dyn AuthService>>,
        cache: ProfileCache,
        view: ViewBinding,
        config: AuthConfig,
    ) -> Self {
        Self {
            service,
            cache,
            view,
            config,
        }
    }

    /// Runs the sequence for `user` and calls `on_ready` exactly once at the end
    pub async fn authorize<F>(&self, user: &TelegramUser, on_ready: F) -> AuthOutcome
    where
        F: FnOnce() + Send,
    {
        // 0 is what an unset id decodes to; the webhook sends it as null too
        let Some(user_id) = user.id.filter(|id| *id != 0) else {
            log::warn!("⚠️ [Auth] No user id, skipping authorization");
            on_ready();
            return AuthOutcome::Skipped;
        };

        let outcome = {
            let _loading = self.view.loading.acquire();
            self.transition(AuthState::Idle, AuthState::Loading);

            match AssertUnwindSafe(self.run(user, user_id)).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(_) => {
                    log::error!("❌ [Auth] Authorization panicked");
                    self.transition(AuthState::Loading, AuthState::Failed);
                    self.pace().await;
                    AuthOutcome::Failed
                }
            }
        };

        self.transition(
            match outcome {
                AuthOutcome::CacheHit => AuthState::CacheHit,
                outcome if outcome.is_authorized() => AuthState::Resolved,
                _ => AuthState::Failed,
            },
            AuthState::Done,
        );
        on_ready();
        outcome
    }

    async fn run(&self, user: &TelegramUser, user_id: i64) -> AuthOutcome {
        if let Some(snapshot) = self.cache.load() {
            self.transition(AuthState::Loading, AuthState::CacheHit);
            self.view.show_cached_profile(&snapshot);
            log::info!("✅ [Auth] Profile loaded from cache");
            return AuthOutcome::CacheHit;
        }

        let Some(service) = self.service.as_ref() else {
            log::error!("❌ [Auth] Webhook client is not configured");
            self.pace().await;
            return AuthOutcome::ServiceUnavailable;
        };

        self.transition(AuthState::Loading, AuthState::NetworkPending);
        let outcome = match service.authorize(user).await {
            Ok(result) => self.resolve(result, user_id),
            Err(e) => {
                log::error!("❌ [Auth] Authorization failed: {}", e);
                AuthOutcome::Failed
            }
        };

        self.pace().await;
        outcome
    }

    fn resolve(&self, result: Value, user_id: i64) -> AuthOutcome {
        let record = match find_user_record(&result, user_id) {
            Ok(Some(record)) => record,
            Ok(None) => {
                log::warn!("⚠️ [Auth] User {} not found in response", user_id);
                return AuthOutcome::NotFound;
            }
            Err(e) => {
                log::warn!("⚠️ [Auth] Unusable response: {}", e);
                return AuthOutcome::NotFound;
            }
        };

        let snapshot = record.to_snapshot();
        let greeting_name = record.first_name().unwrap_or(crate::profile::GUEST_NAME).to_string();
        self.view.show_profile(&snapshot, &greeting_name);
        self.cache.save(&snapshot);

        self.transition(AuthState::NetworkPending, AuthState::Resolved);
        log::info!("✅ [Auth] Profile updated");
        AuthOutcome::Resolved
    }

    async fn pace(&self) {
        if !self.config.pacing_delay.is_zero() {
            tokio::time::sleep(self.config.pacing_delay).await;
        }
    }

    fn transition(&self, from: AuthState, to: AuthState) {
        log::debug!("[Auth] {:?} -> {:?}", from, to);
    }
}

/// Record whose `id` equals `user_id` as a string
///
/// `Ok(None)` for an empty answer (null, empty array) or no match; an
/// error when the answer is not a list of records at all.
pub fn find_user_record(result: &Value, user_id: i64) -> Result<Option<ProfileRecord>, AppError> {
    let items = match result {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        other => {
            return Err(AppError::Validation(format!(
                "expected a list of profile records, got {}",
                other
            )))
        }
    };

    let wanted = user_id.to_string();
    items
        .iter()
        .find(|item| item.get("id").and_then(value_to_string).as_deref() == Some(wanted.as_str()))
        .map(|item| serde_json::from_value(item.clone()).map_err(AppError::from))
        .transpose()
}
