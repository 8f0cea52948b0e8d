use std::collections::HashMap;

use super::types::TelegramUser;
use crate::core::{AppError, AppResult};

/// Разобранная строка `Telegram.WebApp.initData`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitData {
    pub user: Option<TelegramUser>,
    pub auth_date: Option<i64>,
    pub query_id: Option<String>,
    pub start_param: Option<String>,
}

/// Разбирает init data Mini App БЕЗ проверки подписи
///
/// Подпись (`hash`) не проверяется: данные используются только для
/// идентификации пользователя в запросах к вебхуку.
///
/// # Аргументы
/// * `init_data` - Строка с параметрами от Telegram (query string format)
///
/// # Возвращает
/// `Ok(InitData)`; ошибка только если параметр `user` есть, но не является JSON
///
/// # Пример
/// ```
/// use lkcore::telegram::webapp_auth::parse_init_data;
///
/// let data = parse_init_data("user=%7B%22id%22%3A42%7D&auth_date=1700000000").unwrap();
/// assert_eq!(data.user.and_then(|u| u.id), Some(42));
/// ```
pub fn parse_init_data(init_data: &str) -> AppResult<InitData> {
    let params = parse_query(init_data);

    let user = match params.get("user") {
        Some(user_json) => Some(
            serde_json::from_str::<TelegramUser>(user_json)
                .map_err(|e| AppError::Validation(format!("Failed to parse user JSON: {}", e)))?,
        ),
        None => None,
    };

    Ok(InitData {
        user,
        auth_date: params.get("auth_date").and_then(|v| v.parse().ok()),
        query_id: params.get("query_id").cloned(),
        start_param: params.get("start_param").cloned(),
    })
}

/// Извлечение user_id из init data
///
/// # Возвращает
/// `Ok(user_id)` если параметр user найден и содержит id, иначе `Err`
pub fn extract_user_id(init_data: &str) -> AppResult<i64> {
    parse_init_data(init_data)?
        .user
        .ok_or_else(|| AppError::Validation("Missing user parameter".to_string()))?
        .id
        .ok_or_else(|| AppError::Validation("Missing user id in user JSON".to_string()))
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if !key.is_empty() => {
                    // URL decode значений
                    let decoded_value = urlencoding::decode(value).ok()?;
                    Some((key.to_string(), decoded_value.to_string()))
                }
                _ => None,
            }
        })
        .collect()
}
