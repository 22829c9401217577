//! Derived tabular state over a row collection: search, sort,
//! pagination, selection.
//!
//! Nothing is cached between calls - every read recomputes the pipeline
//! (filter, then stable sort, then clamp the page) from the stored rows,
//! so the view can never show state that disagrees with its inputs.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

use crate::utils::{cmp_ignore_case, contains_ignore_case};

use super::export::{write_csv, Column};
use super::selection::{Selection, SelectionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Current sort: no key means input order.
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: None,
            direction: SortDirection::Asc,
        }
    }
}

/// One row of the visible page, with its identity and selection state
/// resolved.
pub struct VisibleRow<'a, T> {
    pub row: &'a T,
    pub id: Option<&'a str>,
    pub selected: bool,
}

/// The computed page: rows plus the pagination facts a caller needs to
/// render controls.
pub struct PageView<'a, T> {
    pub rows: Vec<VisibleRow<'a, T>>,
    pub current_page: usize,
    pub total_pages: usize,
    pub filtered_len: usize,
    pub page_size: usize,
}

impl<T> PageView<'_, T> {
    /// "Showing X to Y of Z results" over the filtered set.
    pub fn summary(&self) -> String {
        let start = if self.filtered_len == 0 {
            0
        } else {
            (self.current_page - 1) * self.page_size + 1
        };
        let end = (self.current_page * self.page_size).min(self.filtered_len);
        format!("Showing {} to {} of {} results", start, end, self.filtered_len)
    }
}

/// Sort rank across JSON value types: null < bool < number < string <
/// composite. Within a type, numbers compare numerically and strings
/// case-insensitively.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => cmp_ignore_case(x, y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => type_rank(a)
                .cmp(&type_rank(b))
                .then_with(|| a.to_string().cmp(&b.to_string())),
        },
    }
}

/// The searchable text of one field. Strings are matched as-is; other
/// scalars and composites match against their JSON text.
fn field_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn row_matches(value: &Value, needle: &str) -> bool {
    match value {
        Value::Object(map) => map
            .values()
            .any(|v| contains_ignore_case(&field_text(v), needle)),
        other => contains_ignore_case(&field_text(other), needle),
    }
}

fn ident_of(value: &Value) -> Option<String> {
    let id = value.get("_id").or_else(|| value.get("id"))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A table over any serializable row type. Rows are projected to JSON
/// once on insertion; search, sort, and identity all read the projection
/// so the engine needs nothing from `T` beyond `Serialize`.
pub struct TableView<T: Serialize> {
    rows: Vec<T>,
    values: Vec<Value>,
    idents: Vec<Option<String>>,
    search: String,
    sort: SortSpec,
    page_size: usize,
    page: usize,
    selection: Selection,
}

impl<T: Serialize> TableView<T> {
    pub fn new(rows: Vec<T>, page_size: usize, mode: SelectionMode) -> Self {
        let mut view = Self {
            rows: Vec::new(),
            values: Vec::new(),
            idents: Vec::new(),
            search: String::new(),
            sort: SortSpec::default(),
            page_size: page_size.max(1),
            page: 1,
            selection: Selection::new(mode),
        };
        view.set_rows(rows);
        view
    }

    /// Replace the underlying rows. Search, sort, page, and selection
    /// survive; the page is re-clamped and stale selected ids simply stop
    /// matching anything visible.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.values = rows
            .iter()
            .map(|r| serde_json::to_value(r).unwrap_or(Value::Null))
            .collect();
        self.idents = self.values.iter().map(ident_of).collect();
        self.rows = rows;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Click-a-column-header semantics: same key flips direction, a new
    /// key sorts ascending.
    pub fn handle_sort(&mut self, key: &str) {
        if self.sort.key.as_deref() == Some(key) {
            self.sort.direction = self.sort.direction.flip();
        } else {
            self.sort = SortSpec {
                key: Some(key.to_string()),
                direction: SortDirection::Asc,
            };
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self) {
        let current = self.page().current_page;
        self.page = current + 1;
    }

    pub fn prev_page(&mut self) {
        let current = self.page().current_page;
        self.page = current.saturating_sub(1).max(1);
    }

    fn filtered(&self) -> Vec<usize> {
        let needle = self.search.trim();
        (0..self.values.len())
            .filter(|&i| needle.is_empty() || row_matches(&self.values[i], needle))
            .collect()
    }

    /// Filtered indices in display order. The sort is stable, so rows
    /// that compare equal keep their input order in both directions.
    fn ordered(&self) -> Vec<usize> {
        let mut indices = self.filtered();
        if let Some(key) = self.sort.key.as_deref() {
            indices.sort_by(|&a, &b| {
                let ord = cmp_values(self.values[a].get(key), self.values[b].get(key));
                match self.sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        indices
    }

    fn total_pages_for(&self, filtered_len: usize) -> usize {
        filtered_len.div_ceil(self.page_size).max(1)
    }

    /// Compute the visible page. The stored page number is clamped to
    /// `[1, total_pages]` here, never when it is set, so shrinking the
    /// filtered set can never leave the view past the end.
    pub fn page(&self) -> PageView<'_, T> {
        let order = self.ordered();
        let filtered_len = order.len();
        let total_pages = self.total_pages_for(filtered_len);
        let current_page = self.page.clamp(1, total_pages);
        let start = (current_page - 1) * self.page_size;

        let rows = order
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|&i| {
                let id = self.idents[i].as_deref();
                VisibleRow {
                    row: &self.rows[i],
                    id,
                    selected: id.map(|id| self.selection.contains(id)).unwrap_or(false),
                }
            })
            .collect();

        PageView {
            rows,
            current_page,
            total_pages,
            filtered_len,
            page_size: self.page_size,
        }
    }

    // ===== Selection =====

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn toggle_selection(&mut self, id: &str) {
        self.selection.toggle(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.ids()
    }

    /// Header-checkbox semantics: if every visible row is already
    /// selected, clear the selection; otherwise select exactly the
    /// visible rows.
    pub fn select_all_visible(&mut self) {
        let visible: Vec<String> = self
            .page()
            .rows
            .iter()
            .filter_map(|r| r.id.map(str::to_string))
            .collect();
        let all_selected =
            !visible.is_empty() && visible.iter().all(|id| self.selection.contains(id));
        if all_selected {
            self.selection.clear();
        } else {
            self.selection.replace(visible);
        }
    }

    // ===== Export =====

    /// CSV of the currently visible page only - what the user sees is
    /// what the file contains.
    pub fn export_csv(&self, columns: &[Column<T>]) -> String {
        let page = self.page();
        write_csv(page.rows.iter().map(|r| r.row), columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Row {
        id: u32,
        v: i64,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, v: 5, name: "Delta Corp" },
            Row { id: 2, v: 5, name: "alpha ltd" },
            Row { id: 3, v: 1, name: "Bravo" },
        ]
    }

    fn visible_ids(view: &TableView<Row>) -> Vec<u32> {
        view.page().rows.iter().map(|r| r.row.id).collect()
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut view = TableView::new(rows(), 10, SelectionMode::Unordered);
        view.handle_sort("v");
        // 5-ties (ids 1, 2) keep their input order
        assert_eq!(visible_ids(&view), vec![3, 1, 2]);

        view.handle_sort("v");
        assert_eq!(visible_ids(&view), vec![1, 2, 3]);
    }

    #[test]
    fn test_handle_sort_flips_then_resets() {
        let mut view = TableView::new(rows(), 10, SelectionMode::Unordered);
        view.handle_sort("v");
        assert_eq!(view.sort().direction, SortDirection::Asc);
        view.handle_sort("v");
        assert_eq!(view.sort().direction, SortDirection::Desc);
        view.handle_sort("name");
        assert_eq!(view.sort().key.as_deref(), Some("name"));
        assert_eq!(view.sort().direction, SortDirection::Asc);
    }

    #[test]
    fn test_string_sort_ignores_case() {
        let mut view = TableView::new(rows(), 10, SelectionMode::Unordered);
        view.handle_sort("name");
        assert_eq!(visible_ids(&view), vec![2, 3, 1]);
    }

    #[test]
    fn test_missing_sort_key_sorts_first() {
        #[derive(Serialize)]
        struct Sparse {
            id: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            v: Option<i64>,
        }
        let mut view = TableView::new(
            vec![
                Sparse { id: 1, v: Some(2) },
                Sparse { id: 2, v: None },
                Sparse { id: 3, v: Some(1) },
            ],
            10,
            SelectionMode::Unordered,
        );
        view.handle_sort("v");
        let ids: Vec<u32> = view.page().rows.iter().map(|r| r.row.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_resets_page() {
        let mut view = TableView::new(rows(), 1, SelectionMode::Unordered);
        view.set_page(3);
        view.set_search("DELTA");
        let page = view.page();
        assert_eq!(page.filtered_len, 1);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.rows[0].row.id, 1);
    }

    #[test]
    fn test_search_matches_numeric_fields_as_text() {
        let mut view = TableView::new(rows(), 10, SelectionMode::Unordered);
        view.set_search("1");
        // matches id:1 on the first row and v:1 / id... on the third
        assert!(view.page().filtered_len >= 2);
    }

    #[test]
    fn test_pagination_clamps() {
        let mut view = TableView::new(rows(), 2, SelectionMode::Unordered);
        assert_eq!(view.page().total_pages, 2);

        view.set_page(5);
        assert_eq!(view.page().current_page, 2);

        // empty rows still report one page
        view.set_rows(Vec::new());
        let page = view.page();
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert!(page.rows.is_empty());
        assert_eq!(page.summary(), "Showing 0 to 0 of 0 results");
    }

    #[test]
    fn test_page_summary() {
        let mut view = TableView::new(rows(), 2, SelectionMode::Unordered);
        assert_eq!(view.page().summary(), "Showing 1 to 2 of 3 results");
        view.next_page();
        assert_eq!(view.page().summary(), "Showing 3 to 3 of 3 results");
    }

    #[test]
    fn test_select_all_visible_toggles() {
        let mut view = TableView::new(rows(), 2, SelectionMode::Unordered);
        view.select_all_visible();
        assert_eq!(view.selected_ids(), vec!["1".to_string(), "2".to_string()]);
        assert!(view.page().rows.iter().all(|r| r.selected));

        // everything visible already selected: clears
        view.select_all_visible();
        assert!(view.selected_ids().is_empty());

        // a partial selection gets replaced, not extended
        view.toggle_selection("3");
        view.select_all_visible();
        assert_eq!(view.selected_ids(), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_selection_survives_set_rows() {
        let mut view = TableView::new(rows(), 10, SelectionMode::Ordered);
        view.toggle_selection("2");
        view.set_rows(rows());
        assert!(view.page().rows.iter().any(|r| r.id == Some("2") && r.selected));
    }

    #[test]
    fn test_underscore_id_takes_precedence() {
        let value = serde_json::json!({"_id": "abc", "id": "other"});
        assert_eq!(ident_of(&value).as_deref(), Some("abc"));
        assert_eq!(ident_of(&serde_json::json!({"name": "x"})), None);
    }
}
