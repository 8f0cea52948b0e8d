//! lkcore - client core of the POS service Telegram Mini-App
//!
//! Everything the Mini-App does that is not rendering lives here: the
//! authorization sequence, the cached profile, contact and QR flows, and
//! the filter/sort engine of the requests table. Rendering and the Telegram
//! host object are reached only through the traits in [`telegram::view`]
//! and [`telegram::host`].
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, retry helpers
//! - `storage`: key-value stores and the profile cache
//! - `profile`: phone formatting, names, greeting, restaurant list decoding
//! - `telegram`: webhook client, response unwrapping, auth/contact/QR flows
//! - `requests`: request rows and the table engine

pub mod core;
pub mod profile;
pub mod requests;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use profile::phone::format_phone_number;
pub use requests::{RequestRow, SortColumn, SortDirection, TableEngine};
pub use storage::{FileStore, KeyValueStore, MemoryStore, ProfileCache, ProfileSnapshot};
pub use telegram::{AuthOrchestrator, AuthOutcome, ViewBinding, WebhookClient};
