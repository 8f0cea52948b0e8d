use serde::{Deserialize, Serialize};

use crate::core::serde_util::{opt_i64_lenient, opt_string_or_number};

/// Пользователь Telegram из `initDataUnsafe.user`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    #[serde(default, deserialize_with = "opt_i64_lenient")]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl TelegramUser {
    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Контакт, собранный из данных пользователя (если телефон уже известен)
    pub fn contact(&self) -> Option<ContactRecord> {
        let phone_number = self.phone_number.clone().filter(|phone| !phone.is_empty())?;
        Some(ContactRecord {
            phone_number: Some(phone_number),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            user_id: self.id,
        })
    }
}

/// Контакт, которым поделился пользователь
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "opt_i64_lenient")]
    pub user_id: Option<i64>,
}

impl ContactRecord {
    /// Имя меняется только если пришла хотя бы одна его часть
    pub fn has_name(&self) -> bool {
        self.first_name.as_deref().is_some_and(|name| !name.is_empty())
            || self.last_name.as_deref().is_some_and(|name| !name.is_empty())
    }
}
