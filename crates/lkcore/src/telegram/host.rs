//! Telegram host bridge
//!
//! The Mini-App runs inside Telegram, which injects `Telegram.WebApp`. The
//! core consumes it only as the capabilities below; every method is
//! allowed to be unsupported by the running client.

use async_trait::async_trait;

use super::types::{ContactRecord, TelegramUser};

/// What `requestContact` reported back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactResponse {
    /// The user refused or closed the dialog
    Declined,
    /// Access was granted; the phone shows up in the user data later
    Granted,
    /// The client handed the contact over directly
    Contact(ContactRecord),
    /// The client handed over a query-string or JSON encoded contact
    Raw(String),
}

#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Current `initDataUnsafe.user`; re-read on every call
    fn user(&self) -> Option<TelegramUser>;

    fn supports_contact_request(&self) -> bool;

    async fn request_contact(&self) -> ContactResponse;

    fn supports_qr_popup(&self) -> bool;

    /// Native scanner; `None` when closed without a result
    async fn scan_qr(&self) -> Option<String>;

    /// `expand()` + `ready()`
    fn ready(&self);
}
