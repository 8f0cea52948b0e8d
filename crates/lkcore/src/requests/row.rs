use chrono::NaiveDate;
use select::document::Document;
use select::predicate::{Attr, Name};

use crate::core::{AppError, AppResult};

/// One row of the requests table
///
/// Dates are kept twice: the sortable form (`YYYY-MM-DD`, empty when
/// unknown) used for filtering and sorting, and the text shown in the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRow {
    pub number: i64,
    pub date_created: String,
    pub date_completed: String,
    pub establishment: String,
    pub date_created_display: String,
    pub date_completed_display: String,
}

impl RequestRow {
    /// Row built from raw cell values; dates are shown as given
    pub fn new(number: i64, date_created: &str, date_completed: &str, establishment: &str) -> Self {
        Self {
            number,
            date_created: normalize_date(date_created),
            date_completed: normalize_date(date_completed),
            establishment: establishment.to_string(),
            date_created_display: date_created.to_string(),
            date_completed_display: date_completed.to_string(),
        }
    }
}

/// Normalizes a date to the sortable `YYYY-MM-DD` form
///
/// Accepts ISO dates (optionally followed by a time part) and the
/// `DD.MM.YYYY` display form. Empty input stays empty; anything else is
/// returned trimmed, so it can still match itself exactly.
///
/// ```
/// use lkcore::requests::row::normalize_date;
///
/// assert_eq!(normalize_date("15.01.2024"), "2024-01-15");
/// assert_eq!(normalize_date("2024-01-15T10:00:00"), "2024-01-15");
/// assert_eq!(normalize_date(" "), "");
/// ```
pub fn normalize_date(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }

    let iso_prefix = input.get(..10).unwrap_or(input);
    if let Ok(date) = NaiveDate::parse_from_str(iso_prefix, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%d.%m.%Y") {
        return date.format("%Y-%m-%d").to_string();
    }

    input.to_string()
}

/// Leading integer of a cell, the way `parseInt` reads it
fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    text[..end].parse().ok()
}

/// Reads request rows from server-rendered table markup
///
/// Rows come from `#requests-table-body` when present, otherwise from every
/// `tr` in the document. Rows with fewer than four `td` cells (headers,
/// placeholders) are skipped. Date cells are read from their `data-sort`
/// attribute, falling back to the cell text.
pub fn read_rows(html: &str) -> AppResult<Vec<RequestRow>> {
    let document = Document::from(html);

    let body = document.find(Attr("id", "requests-table-body")).next();
    let rows: Vec<_> = match body {
        Some(body) => body.find(Name("tr")).collect(),
        None => document.find(Name("tr")).collect(),
    };

    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let cells: Vec<_> = row.find(Name("td")).collect();
        if cells.len() < 4 {
            continue;
        }

        let number_text = cells[0].text();
        let number = parse_leading_int(&number_text)
            .ok_or_else(|| AppError::Validation(format!("request number is not an integer: {:?}", number_text.trim())))?;

        let date = |index: usize| {
            let display = cells[index].text().trim().to_string();
            let sortable = cells[index]
                .attr("data-sort")
                .map(normalize_date)
                .unwrap_or_else(|| normalize_date(&display));
            (sortable, display)
        };
        let (date_created, date_created_display) = date(1);
        let (date_completed, date_completed_display) = date(2);

        result.push(RequestRow {
            number,
            date_created,
            date_completed,
            establishment: cells[3].text().trim().to_string(),
            date_created_display,
            date_completed_display,
        });
    }

    log::debug!("[Requests] Read {} rows from markup", result.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = r#"
        <table id="requests-table">
          <thead>
            <tr>
              <th class="sortable" data-column="number">№ <span class="sort-arrow"></span></th>
              <th class="sortable" data-column="date-created">Создана</th>
              <th class="sortable" data-column="date-completed">Выполнена</th>
              <th class="sortable" data-column="establishment">Заведение</th>
            </tr>
          </thead>
          <tbody id="requests-table-body">
            <tr><td>3</td><td data-sort="2024-01-15">15.01.2024</td><td data-sort="">—</td><td>Cafe A</td></tr>
            <tr><td> 12 </td><td>02.02.2024</td><td data-sort="2024-02-03">03.02.2024</td><td> Bar B </td></tr>
          </tbody>
        </table>"#;

    #[test]
    fn test_read_rows() {
        let rows = read_rows(TABLE).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].number, 3);
        assert_eq!(rows[0].date_created, "2024-01-15");
        assert_eq!(rows[0].date_created_display, "15.01.2024");
        assert_eq!(rows[0].date_completed, "");
        assert_eq!(rows[0].establishment, "Cafe A");

        assert_eq!(rows[1].number, 12);
        assert_eq!(rows[1].date_created, "2024-02-02");
        assert_eq!(rows[1].establishment, "Bar B");
    }

    #[test]
    fn test_read_rows_rejects_bad_numbers() {
        let html = "<table><tr><td>abc</td><td></td><td></td><td>X</td></tr></table>";
        assert!(read_rows(html).is_err());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("42abc"), Some(42));
        assert_eq!(parse_leading_int("-7"), Some(-7));
        assert_eq!(parse_leading_int("abc"), None);
    }

    #[test]
    fn test_normalize_date_keeps_unknown_formats() {
        assert_eq!(normalize_date("вчера"), "вчера");
        assert_eq!(normalize_date("2024-13-45"), "2024-13-45");
    }
}
