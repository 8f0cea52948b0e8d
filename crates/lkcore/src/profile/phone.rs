/// Маска, которая показывается, пока телефон неизвестен
pub const PHONE_PLACEHOLDER: &str = "+7 (XXX)-XXX-XXXX";

/// Телефон в любом виде, в котором он приходит: строкой или числом
#[derive(Debug, Clone, Copy)]
pub enum PhoneInput<'a> {
    Text(&'a str),
    Number(i64),
}

impl<'a> From<&'a str> for PhoneInput<'a> {
    fn from(value: &'a str) -> Self {
        PhoneInput::Text(value)
    }
}

impl<'a> From<&'a String> for PhoneInput<'a> {
    fn from(value: &'a String) -> Self {
        PhoneInput::Text(value.as_str())
    }
}

impl From<i64> for PhoneInput<'_> {
    fn from(value: i64) -> Self {
        PhoneInput::Number(value)
    }
}

/// Форматирует телефон в маску `+7 (DDD)-DDD-DD-DD`.
///
/// Отсутствующий или пустой номер даёт [`PHONE_PLACEHOLDER`]. Из остальных
/// удаляются все нецифровые символы. Российский мобильный номер из
/// 11 цифр, начинающийся с `7`, форматируется точно; всё прочее режется
/// по позициям в ту же маску, так что кривой ввод может отобразиться
/// некорректно.
///
/// # Example
///
/// ```
/// use lkcore::format_phone_number;
///
/// assert_eq!(format_phone_number(Some("79991234567")), "+7 (999)-123-45-67");
/// assert_eq!(format_phone_number(None::<&str>), "+7 (XXX)-XXX-XXXX");
/// assert_eq!(format_phone_number(Some(79991234567_i64)), "+7 (999)-123-45-67");
/// ```
pub fn format_phone_number<'a, P>(phone: Option<P>) -> String
where
    P: Into<PhoneInput<'a>>,
{
    let digits: String = match phone.map(Into::into) {
        None => return PHONE_PLACEHOLDER.to_string(),
        Some(PhoneInput::Text(text)) if text.is_empty() => return PHONE_PLACEHOLDER.to_string(),
        Some(PhoneInput::Text(text)) => text.chars().filter(char::is_ascii_digit).collect(),
        Some(PhoneInput::Number(n)) => n.to_string().chars().filter(char::is_ascii_digit).collect(),
    };

    if digits.len() == 11 && digits.starts_with('7') {
        return format!(
            "+7 ({})-{}-{}-{}",
            &digits[1..4],
            &digits[4..7],
            &digits[7..9],
            &digits[9..11]
        );
    }

    format!(
        "+7 ({})-{}-{}-{}",
        slice(&digits, 0, 3),
        slice(&digits, 3, 6),
        slice(&digits, 6, 8),
        slice(&digits, 8, 10)
    )
}

/// Подстрока по позициям с обрезкой по длине (только ASCII-цифры)
fn slice(digits: &str, start: usize, end: usize) -> &str {
    let end = end.min(digits.len());
    let start = start.min(end);
    &digits[start..end]
}
