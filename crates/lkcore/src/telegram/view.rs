//! View binding
//!
//! Every element the core writes to is reached through one of these traits,
//! bundled once into a [`ViewBinding`] and handed to each flow.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::types::TelegramUser;
use crate::profile::phone::{format_phone_number, PHONE_PLACEHOLDER};
use crate::profile::{self, GUEST_NAME};
use crate::requests::TableView;
use crate::storage::{ProfileSnapshot, Restaurant};

pub trait LoadingIndicator: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

pub trait ProfileView: Send + Sync {
    fn set_full_name(&self, full_name: &str);
    fn set_greeting_name(&self, name: &str);
    /// Already formatted phone
    fn set_phone(&self, phone: &str);
    fn set_share_contact_visible(&self, visible: bool);
    fn set_restaurants(&self, restaurants: &[Restaurant]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Info,
    Error,
}

impl PopupKind {
    pub fn title(self) -> &'static str {
        match self {
            PopupKind::Info => "Информация",
            PopupKind::Error => "Ошибка",
        }
    }
}

/// Dismissable messages for user-initiated actions
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: PopupKind, message: &str);
}

/// Reference-counted loading indicator
///
/// Shown while at least one [`LoadingGuard`] is alive, hidden when the last
/// one drops (including during unwinding).
pub struct SharedLoading {
    indicator: Arc<dyn LoadingIndicator>,
    holders: AtomicUsize,
}

impl SharedLoading {
    pub fn new(indicator: Arc<dyn LoadingIndicator>) -> Arc<Self> {
        Arc::new(Self {
            indicator,
            holders: AtomicUsize::new(0),
        })
    }

    pub fn acquire(self: &Arc<Self>) -> LoadingGuard {
        if self.holders.fetch_add(1, Ordering::SeqCst) == 0 {
            self.indicator.show();
        }
        LoadingGuard { owner: self.clone() }
    }

    pub fn is_visible(&self) -> bool {
        self.holders.load(Ordering::SeqCst) > 0
    }
}

#[must_use = "the indicator hides as soon as the guard is dropped"]
pub struct LoadingGuard {
    owner: Arc<SharedLoading>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.owner.holders.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.owner.indicator.hide();
        }
    }
}

/// Everything the flows render into, constructed once at startup
#[derive(Clone)]
pub struct ViewBinding {
    pub profile: Arc<dyn ProfileView>,
    pub loading: Arc<SharedLoading>,
    pub table: Arc<dyn TableView>,
    pub notifier: Arc<dyn Notifier>,
}

impl ViewBinding {
    pub fn new(
        profile: Arc<dyn ProfileView>,
        loading: Arc<dyn LoadingIndicator>,
        table: Arc<dyn TableView>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            profile,
            loading: SharedLoading::new(loading),
            table,
            notifier,
        }
    }

    pub fn info(&self, message: &str) {
        log::info!("ℹ️ {}", message);
        self.notifier.notify(PopupKind::Info, message);
    }

    pub fn error(&self, message: &str) {
        log::error!("❌ {}", message);
        self.notifier.notify(PopupKind::Error, message);
    }

    /// First paint from the Telegram user, before any authorization
    pub fn show_telegram_user(&self, user: Option<&TelegramUser>) {
        let Some(user) = user else {
            self.profile.set_greeting_name(GUEST_NAME);
            return;
        };

        let first_name = user.first_name.as_deref().filter(|name| !name.is_empty());
        self.profile.set_greeting_name(first_name.unwrap_or(GUEST_NAME));
        self.profile
            .set_full_name(&profile::compose_full_name(first_name, user.last_name.as_deref()));

        match user.phone_number.as_deref().filter(|phone| !phone.is_empty()) {
            Some(phone) => self.profile.set_phone(&format_phone_number(Some(phone))),
            None => {
                self.profile.set_phone(PHONE_PLACEHOLDER);
                self.profile.set_share_contact_visible(true);
            }
        }
    }

    /// Renders a profile; the greeting uses `greeting_name`
    pub fn show_profile(&self, snapshot: &ProfileSnapshot, greeting_name: &str) {
        let full_name = match snapshot.full_name.as_str() {
            "" => profile::NO_NAME,
            name => name,
        };
        self.profile.set_full_name(full_name);
        self.profile.set_greeting_name(greeting_name);

        if let Some(phone) = snapshot.phone.as_deref().filter(|phone| !phone.is_empty()) {
            self.profile.set_phone(&format_phone_number(Some(phone)));
            self.profile.set_share_contact_visible(false);
        }

        self.profile.set_restaurants(&snapshot.restaurants);
    }

    /// Renders a cached snapshot; the greeting is its first word
    pub fn show_cached_profile(&self, snapshot: &ProfileSnapshot) {
        self.show_profile(snapshot, profile::greeting_name(&snapshot.full_name));
    }
}
