//! Telegram Mini-App integration: webhook, host bridge, view binding and
//! the flows built on them

pub mod api;
pub mod auth;
pub mod contact;
pub mod host;
pub mod qr;
pub mod types;
pub mod unwrap;
pub mod view;
pub mod webapp_auth;

pub use api::{AuthService, WebhookClient, WebhookPayload};
pub use auth::{AuthConfig, AuthOrchestrator, AuthOutcome, AuthState};
pub use contact::{parse_contact_string, ContactFlow, ContactOutcome};
pub use host::{ContactResponse, HostBridge};
pub use qr::{Camera, CameraError, CameraSession, CameraStream, PermissionState, QrFlow, QrOutcome};
pub use types::{ContactRecord, TelegramUser};
pub use unwrap::unwrap_response;
pub use view::{LoadingGuard, LoadingIndicator, Notifier, PopupKind, ProfileView, SharedLoading, ViewBinding};
