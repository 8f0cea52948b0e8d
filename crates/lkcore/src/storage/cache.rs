use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::KeyValueStore;
use crate::core::config;
use crate::core::serde_util::{opt_string_or_number, string_or_number};

/// Source of "now" in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Заведение, доступное пользователю
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// Снимок профиля, который хранится в кэше
///
/// `timestamp` всегда выставляет [`ProfileCache::save`], значение
/// вызывающей стороны перезаписывается.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub full_name: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub timestamp: i64,
}

impl ProfileSnapshot {
    pub fn new(full_name: impl Into<String>, phone: Option<String>, restaurants: Vec<Restaurant>) -> Self {
        Self {
            full_name: full_name.into(),
            phone,
            restaurants,
            timestamp: 0,
        }
    }
}

/// Кэш профиля с TTL поверх [`KeyValueStore`]
///
/// Ни один метод не возвращает ошибку: сбои хранилища логируются и
/// считаются промахом кэша.
#[derive(Clone)]
pub struct ProfileCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    ttl_ms: i64,
}

impl ProfileCache {
    /// Кэш с ключом и TTL по умолчанию
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            key: config::cache::PROFILE_KEY.to_string(),
            ttl_ms: config::cache::TTL_MS,
        }
    }

    /// Сохраняет снимок, проставляя текущее время записи
    pub fn save(&self, snapshot: &ProfileSnapshot) {
        let stamped = ProfileSnapshot {
            timestamp: self.clock.now_ms(),
            ..snapshot.clone()
        };

        let encoded = match serde_json::to_string(&stamped) {
            Ok(encoded) => encoded,
            Err(e) => {
                log::error!("❌ [Cache] Failed to encode profile snapshot: {}", e);
                return;
            }
        };

        match self.store.set(&self.key, &encoded) {
            Ok(()) => log::info!("💾 [Cache] Profile saved"),
            Err(e) => log::error!("❌ [Cache] Failed to save profile: {}", e),
        }
    }

    /// Загружает снимок, если он есть, читается и не старше TTL
    pub fn load(&self) -> Option<ProfileSnapshot> {
        let snapshot = self.read()?;

        // A damaged timestamp far in the past cannot be subtracted
        let Some(age) = self.clock.now_ms().checked_sub(snapshot.timestamp) else {
            log::warn!("⚠️ [Cache] Profile timestamp out of range: {}", snapshot.timestamp);
            return None;
        };
        if age > self.ttl_ms {
            log::info!("🕒 [Cache] Profile is stale ({} ms old)", age);
            return None;
        }

        log::info!("📂 [Cache] Profile loaded");
        Some(snapshot)
    }

    /// Записывает телефон (и имя, если известно) поверх существующей записи,
    /// даже устаревшей, и сохраняет с новым временем записи
    pub fn merge_contact(&self, phone: &str, full_name: Option<String>) {
        let mut snapshot = self.read().unwrap_or_default();
        snapshot.phone = Some(phone.to_string());
        if let Some(full_name) = full_name {
            snapshot.full_name = full_name;
        }
        self.save(&snapshot);
    }

    /// Удаляет запись
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            log::error!("❌ [Cache] Failed to clear profile: {}", e);
        }
    }

    fn read(&self) -> Option<ProfileSnapshot> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::error!("❌ [Cache] Failed to read profile: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::error!("❌ [Cache] Stored profile is not readable: {}", e);
                None
            }
        }
    }
}
