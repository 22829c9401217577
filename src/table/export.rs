//! CSV export of table rows.

use chrono::Utc;

/// One exported column: a header label and an accessor that renders the
/// cell text for a row.
pub struct Column<T> {
    label: String,
    accessor: Box<dyn Fn(&T) -> String>,
}

impl<T> Column<T> {
    pub fn new(label: impl Into<String>, accessor: impl Fn(&T) -> String + 'static) -> Self {
        Self {
            label: label.into(),
            accessor: Box::new(accessor),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self, row: &T) -> String {
        (self.accessor)(row)
    }
}

/// Every value cell is quoted with internal quotes doubled; header labels
/// are written as-is.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

pub fn write_csv<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    columns: &[Column<T>],
) -> String {
    let mut lines = Vec::new();
    lines.push(
        columns
            .iter()
            .map(Column::label)
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            columns
                .iter()
                .map(|c| quote(&c.value(row)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Suggested download name: `{tag}-{YYYY-MM-DD}.csv`.
pub fn export_filename(tag: &str) -> String {
    format!("{}-{}.csv", tag, Utc::now().format("%Y-%m-%d"))
}
