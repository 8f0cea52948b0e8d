//! Filter and sort engine of the requests table
//!
//! The rows read at setup are never touched again. Every filter input
//! change and every header click recomputes the visible rows from that
//! original order and hands the whole result to the view.

use std::cmp::Ordering;
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use super::row::{normalize_date, RequestRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum SortColumn {
    Number,
    DateCreated,
    DateCompleted,
    Establishment,
}

impl SortColumn {
    /// Cell index in the row markup
    pub fn index(self) -> usize {
        match self {
            SortColumn::Number => 0,
            SortColumn::DateCreated => 1,
            SortColumn::DateCompleted => 2,
            SortColumn::Establishment => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// At most one active sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    /// Header click: same column toggles, another column starts ascending
    pub fn click(&mut self, column: SortColumn) {
        if self.column == Some(column) {
            self.direction = self.direction.toggled();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Asc;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum FilterField {
    DateCreated,
    DateCompleted,
    Establishment,
}

/// Filter input values; empty means "no filter"
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub date_created: String,
    pub date_completed: String,
    pub establishment: String,
}

impl FilterState {
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::DateCreated => &self.date_created,
            FilterField::DateCompleted => &self.date_completed,
            FilterField::Establishment => &self.establishment,
        }
    }

    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::DateCreated => self.date_created = value,
            FilterField::DateCompleted => self.date_completed = value,
            FilterField::Establishment => self.establishment = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date_created.is_empty() && self.date_completed.is_empty() && self.establishment.is_empty()
    }

    /// Same filters with dates in their sortable form
    pub fn normalized(&self) -> Self {
        Self {
            date_created: normalize_date(&self.date_created),
            date_completed: normalize_date(&self.date_completed),
            establishment: self.establishment.clone(),
        }
    }

    /// Exact match on every non-empty field; an empty cell never matches
    /// a non-empty filter. Expects [`FilterState::normalized`] values.
    pub fn matches(&self, row: &RequestRow) -> bool {
        let field_matches = |filter: &str, cell: &str| filter.is_empty() || (!cell.is_empty() && cell == filter);

        field_matches(&self.date_created, &row.date_created)
            && field_matches(&self.date_completed, &row.date_completed)
            && field_matches(&self.establishment, &row.establishment)
    }
}

/// Case-folded comparison with an exact tie-break
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn sort_key(row: &RequestRow, column: SortColumn) -> &str {
    match column {
        SortColumn::Number => "",
        SortColumn::DateCreated => &row.date_created,
        SortColumn::DateCompleted => &row.date_completed,
        SortColumn::Establishment => &row.establishment,
    }
}

/// Row comparator for `column`; empty keys go last in both directions
pub fn compare_rows(a: &RequestRow, b: &RequestRow, column: SortColumn, direction: SortDirection) -> Ordering {
    let ordering = match column {
        SortColumn::Number => a.number.cmp(&b.number),
        SortColumn::DateCreated | SortColumn::DateCompleted => {
            let (a_key, b_key) = (sort_key(a, column), sort_key(b, column));
            match (a_key.is_empty(), b_key.is_empty()) {
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                (true, true) => return Ordering::Equal,
                (false, false) => a_key.cmp(b_key),
            }
        }
        SortColumn::Establishment => {
            let (a_key, b_key) = (sort_key(a, column), sort_key(b, column));
            match (a_key.is_empty(), b_key.is_empty()) {
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                (true, true) => return Ordering::Equal,
                (false, false) => locale_compare(a_key, b_key),
            }
        }
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Filtered and sorted view of `rows`; `rows` keeps its order
pub fn filter_and_sort(rows: &[RequestRow], filters: &FilterState, sort: SortState) -> Vec<RequestRow> {
    let filters = filters.normalized();
    let mut visible: Vec<RequestRow> = rows.iter().filter(|row| filters.matches(row)).cloned().collect();

    if let Some(column) = sort.column {
        // stable: equal keys keep their original relative order
        visible.sort_by(|a, b| compare_rows(a, b, column, sort.direction));
    }
    visible
}

/// Rendering side of the table
pub trait TableView: Send + Sync {
    /// Replaces the whole body with `rows`
    fn render_rows(&self, rows: &[RequestRow]);

    /// Arrow of one header; `None` clears it
    fn set_sort_indicator(&self, column: SortColumn, direction: Option<SortDirection>);

    /// Writes a filter input back (used when clearing)
    fn set_filter_input(&self, field: FilterField, value: &str);

    /// Cosmetic entrance animation of the filters panel
    fn play_entrance(&self);
}

pub struct TableEngine {
    original: Vec<RequestRow>,
    filters: FilterState,
    sort: SortState,
    view: Arc<dyn TableView>,
}

impl TableEngine {
    /// Captures the initial row order; nothing is rendered yet
    pub fn new(rows: Vec<RequestRow>, view: Arc<dyn TableView>) -> Self {
        log::debug!("[Requests] Table set up with {} rows", rows.len());
        Self {
            original: rows,
            filters: FilterState::default(),
            sort: SortState::default(),
            view,
        }
    }

    pub fn original_rows(&self) -> &[RequestRow] {
        &self.original
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Filter input changed
    pub fn set_filter(&mut self, field: FilterField, value: &str) -> Vec<RequestRow> {
        self.filters.set(field, value);
        self.apply()
    }

    /// "Clear filters" button: empties every input and re-renders
    pub fn clear_filters(&mut self) -> Vec<RequestRow> {
        self.filters = FilterState::default();
        for field in FilterField::iter() {
            self.view.set_filter_input(field, "");
        }
        self.apply()
    }

    /// Sortable header clicked
    pub fn click_header(&mut self, column: SortColumn) -> Vec<RequestRow> {
        self.sort.click(column);

        for other in SortColumn::iter() {
            self.view.set_sort_indicator(other, None);
        }
        self.view.set_sort_indicator(column, Some(self.sort.direction));

        self.apply()
    }

    /// Recomputes from the original rows and renders the result
    pub fn apply(&self) -> Vec<RequestRow> {
        let visible = filter_and_sort(&self.original, &self.filters, self.sort);
        self.view.render_rows(&visible);
        visible
    }
}
