//! Profile presentation helpers
//!
//! Name composition, greeting, phone mask and the decoding of profile
//! records returned by the webhook into a [`ProfileSnapshot`].

pub mod phone;

use chrono::Timelike;
use serde::Deserialize;
use serde_json::Value;

use crate::storage::{ProfileSnapshot, Restaurant};

/// Shown in the greeting when no first name is known
pub const GUEST_NAME: &str = "Гость";

/// Shown as the full name when neither part is known
pub const NO_NAME: &str = "Без имени";

/// Greeting for the given local hour (0-23)
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Доброе утро",
        12..=16 => "Добрый день",
        17..=22 => "Добрый вечер",
        _ => "Доброй ночи",
    }
}

/// Greeting for the current local time
pub fn greeting_now() -> &'static str {
    greeting_for_hour(chrono::Local::now().hour())
}

/// Joins the non-empty name parts with a space, or [`NO_NAME`]
pub fn compose_full_name(first: Option<&str>, last: Option<&str>) -> String {
    let parts: Vec<&str> = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        NO_NAME.to_string()
    } else {
        parts.join(" ")
    }
}

/// First word of a full name, or [`GUEST_NAME`] when there is none
pub fn greeting_name(full_name: &str) -> &str {
    full_name.split(' ').find(|part| !part.is_empty()).unwrap_or(GUEST_NAME)
}

/// Name edit dialog state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileEdit {
    pub first_name: String,
    pub last_name: String,
}

impl ProfileEdit {
    /// Prefills the dialog from the displayed full name (first two words)
    pub fn from_full_name(full_name: &str) -> Self {
        let mut parts = full_name.split(' ');
        Self {
            first_name: parts.next().unwrap_or_default().to_string(),
            last_name: parts.next().unwrap_or_default().to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        compose_full_name(Some(&self.first_name), Some(&self.last_name))
    }

    pub fn greeting_name(&self) -> &str {
        match self.first_name.trim() {
            "" => GUEST_NAME,
            first => first,
        }
    }
}

/// Establishment picker of the invoices page
///
/// The modal lists the user's establishments; picking one closes it and
/// replaces the previous choice. Cancelling keeps the choice as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstablishmentPicker {
    items: Vec<String>,
    selected: Option<usize>,
    open: bool,
}

impl EstablishmentPicker {
    pub fn new(restaurants: &[Restaurant]) -> Self {
        Self {
            items: restaurants.iter().map(|r| r.name.trim().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn cancel(&mut self) {
        self.open = false;
    }

    /// Picks the item named `name` (compared trimmed); unknown names change nothing
    pub fn select(&mut self, name: &str) -> Option<&str> {
        let name = name.trim();
        let index = self.items.iter().position(|item| item == name)?;
        self.selected = Some(index);
        self.open = false;
        self.selected()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.and_then(|index| self.items.get(index)).map(String::as_str)
    }
}

/// One element of the webhook `auth` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub phone: Value,
    #[serde(default)]
    pub restaurants: Value,
}

impl ProfileRecord {
    pub fn first_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn full_name(&self) -> String {
        let last = self
            .last_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.family.as_deref());
        compose_full_name(self.first_name(), last)
    }

    pub fn phone(&self) -> Option<String> {
        value_to_string(&self.phone).filter(|phone| !phone.is_empty())
    }

    /// Converts the record into a snapshot (timestamp is stamped by the cache)
    pub fn to_snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot::new(
            self.full_name(),
            self.phone(),
            parse_restaurants(&self.restaurants).unwrap_or_default(),
        )
    }
}

/// String form of a JSON scalar, the way identifiers are compared
///
/// `"42"` and `42` both become `"42"`; null, arrays and objects have none.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decodes the restaurant list: a JSON array or a JSON-encoded string of one
///
/// Entries without a non-empty `id` and `name` are skipped. Any other
/// shape is reported and yields `None`.
pub fn parse_restaurants(raw: &Value) -> Option<Vec<Restaurant>> {
    let items = match raw {
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                log::warn!("⚠️ [Profile] Restaurant list is not an array");
                return None;
            }
            Err(e) => {
                log::error!("❌ [Profile] Failed to parse restaurant list: {}", e);
                return None;
            }
        },
        Value::Array(items) => items.clone(),
        _ => {
            log::warn!("⚠️ [Profile] Unexpected restaurant list format");
            return None;
        }
    };

    let restaurants: Vec<Restaurant> = items
        .iter()
        .filter_map(|item| {
            let id = value_to_string(item.get("id")?).filter(|id| !id.is_empty() && id != "0")?;
            let name = item.get("name")?.as_str().filter(|name| !name.is_empty())?;
            Some(Restaurant {
                id,
                name: name.to_string(),
            })
        })
        .collect();

    log::info!("✅ [Profile] Loaded {} restaurants", restaurants.len());
    Some(restaurants)
}
