use std::sync::Arc;

use super::host::{ContactResponse, HostBridge};
use super::types::ContactRecord;
use super::view::ViewBinding;
use crate::core::retry::{poll_until, RetryConfig};
use crate::profile::phone::format_phone_number;
use crate::profile::{compose_full_name, GUEST_NAME};
use crate::storage::ProfileCache;

/// Разбирает контакт, пришедший строкой
///
/// Попытка 1: query string с параметром `contact` (JSON, закодированный
/// в URL). Попытка 2: вся строка как JSON. Если обе не удались, `None`.
///
/// # Example
///
/// ```
/// use lkcore::telegram::contact::parse_contact_string;
///
/// let raw = "contact=%7B%22phone_number%22%3A%2279991234567%22%7D&hash=x";
/// let contact = parse_contact_string(raw).unwrap();
/// assert_eq!(contact.phone_number.as_deref(), Some("79991234567"));
/// ```
pub fn parse_contact_string(input: &str) -> Option<ContactRecord> {
    if let Some(contact) = contact_from_query(input) {
        return Some(contact);
    }

    match serde_json::from_str::<ContactRecord>(input) {
        Ok(contact) => Some(contact),
        Err(e) => {
            log::warn!("⚠️ [Contact] Not a JSON contact: {}", e);
            None
        }
    }
}

fn contact_from_query(input: &str) -> Option<ContactRecord> {
    let query = input.trim_start_matches('?');
    let (_, value) = url::form_urlencoded::parse(query.as_bytes()).find(|(key, _)| key == "contact")?;

    // Клиенты кодируют значение ещё раз поверх query string
    let decoded = urlencoding::decode(&value).ok()?;
    match serde_json::from_str(&decoded) {
        Ok(contact) => Some(contact),
        Err(e) => {
            log::debug!("[Contact] `contact` parameter is not JSON: {}", e);
            None
        }
    }
}

/// Итог запроса контакта
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Телефон получен и показан
    Updated(ContactRecord),
    /// Клиент Telegram не умеет `requestContact`
    Unsupported,
    /// Пользователь отказал
    Declined,
    /// Доступ дан, но телефон так и не появился в данных пользователя
    Pending,
    /// Контакт пришёл без телефона или не разобрался
    Invalid,
}

/// Запрос контакта через Telegram и обновление профиля
pub struct ContactFlow {
    host: Arc<dyn HostBridge>,
    cache: ProfileCache,
    view: ViewBinding,
    poll: RetryConfig,
}

impl ContactFlow {
    pub fn new(host: Arc<dyn HostBridge>, cache: ProfileCache, view: ViewBinding) -> Self {
        Self {
            host,
            cache,
            view,
            poll: RetryConfig::contact_poll(),
        }
    }

    /// Расписание повторного чтения данных пользователя после `Granted`
    #[must_use]
    pub fn with_poll(mut self, poll: RetryConfig) -> Self {
        self.poll = poll;
        self
    }

    pub async fn request(&self) -> ContactOutcome {
        log::info!("📤 [Contact] Requesting contact");

        if !self.host.supports_contact_request() {
            self.view.error("Метод requestContact не поддерживается");
            return ContactOutcome::Unsupported;
        }

        match self.host.request_contact().await {
            ContactResponse::Declined => {
                self.view.error("Контакт не был предоставлен. Попробуйте еще раз.");
                ContactOutcome::Declined
            }
            ContactResponse::Granted => self.await_granted_contact().await,
            ContactResponse::Contact(contact) => self.apply(contact),
            ContactResponse::Raw(raw) => match parse_contact_string(&raw) {
                Some(contact) => self.apply(contact),
                None => {
                    log::warn!("⚠️ [Contact] Failed to parse contact string: {}", raw);
                    ContactOutcome::Invalid
                }
            },
        }
    }

    /// Телефон появляется в данных пользователя с задержкой, перечитываем
    async fn await_granted_contact(&self) -> ContactOutcome {
        let host = self.host.clone();
        let result = poll_until(&self.poll, || {
            let host = host.clone();
            async move { host.user().and_then(|user| user.contact()) }
        })
        .await;

        match result.value {
            Some(contact) => {
                log::info!("✅ [Contact] Phone received after {} attempt(s)", result.attempts);
                self.apply(contact)
            }
            None => {
                self.view.info(
                    "Контакт запрошен. Если номер не отобразился, пожалуйста, перезапустите приложение.",
                );
                ContactOutcome::Pending
            }
        }
    }

    /// Показывает контакт и дописывает его в кэш профиля
    pub fn apply(&self, contact: ContactRecord) -> ContactOutcome {
        let Some(phone) = contact.phone_number.clone().filter(|phone| !phone.is_empty()) else {
            self.view.error("Номер телефона не найден в данных контакта");
            return ContactOutcome::Invalid;
        };

        let profile = &self.view.profile;
        profile.set_phone(&format_phone_number(Some(&phone)));

        let full_name = contact.has_name().then(|| {
            let full_name = compose_full_name(contact.first_name.as_deref(), contact.last_name.as_deref());
            profile.set_full_name(&full_name);
            profile.set_greeting_name(
                contact
                    .first_name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(GUEST_NAME),
            );
            full_name
        });

        profile.set_share_contact_visible(false);
        self.cache.merge_contact(&phone, full_name);

        self.view.info("Номер телефона успешно обновлен!");
        ContactOutcome::Updated(contact)
    }
}
