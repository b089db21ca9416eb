//! Table rendering contract shared by every list screen.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use models::{Entity, EntityId};

pub const MISSING_CELL: &str = "-";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

pub type CellFormatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

#[derive(Clone)]
pub struct Column {
    pub header: String,
    /// Dotted path into the row's JSON, e.g. `country.name.uz`.
    pub field: String,
    pub align: Align,
    formatter: Option<CellFormatter>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("header", &self.header)
            .field("field", &self.field)
            .field("align", &self.align)
            .finish_non_exhaustive()
    }
}

impl Column {
    pub fn new(header: impl Into<String>, field: impl Into<String>) -> Self {
        Self { header: header.into(), field: field.into(), align: Align::Left, formatter: None }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Custom rendering for the value found at `field`.
    pub fn format_with(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    fn cell(&self, row: &Value) -> String {
        match lookup(row, &self.field) {
            None | Some(Value::Null) => MISSING_CELL.to_string(),
            Some(v) => match &self.formatter {
                Some(f) => f(v),
                None => plain(v),
            },
        }
    }
}

/// Follow a dotted path through nested objects.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').filter(|s| !s.is_empty()).try_fold(value, |v, key| v.get(key))
}

fn plain(v: &Value) -> String {
    match v {
        Value::String(s) if s.trim().is_empty() => MISSING_CELL.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(plain).collect();
            if parts.is_empty() { MISSING_CELL.to_string() } else { parts.join(", ") }
        }
        other => other.to_string(),
    }
}

#[derive(Clone, Debug)]
pub struct Table {
    pub columns: Vec<Column>,
    pub row_numbers: bool,
    pub deletable: bool,
    pub empty_message: String,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, row_numbers: true, deletable: true, empty_message: "No data found.".into() }
    }

    pub fn without_row_numbers(mut self) -> Self {
        self.row_numbers = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.deletable = false;
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn render<E: Entity>(&self, rows: &[E]) -> RenderedTable {
        let mut headers = Vec::with_capacity(self.columns.len() + 2);
        let mut aligns = Vec::with_capacity(self.columns.len() + 2);
        if self.row_numbers {
            headers.push("#".to_string());
            aligns.push(Align::Right);
        }
        for c in &self.columns {
            headers.push(c.header.clone());
            aligns.push(c.align);
        }
        if self.deletable {
            headers.push("Actions".to_string());
            aligns.push(Align::Center);
        }

        let mut cells = Vec::with_capacity(rows.len());
        let mut ids = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let json = serde_json::to_value(row).unwrap_or(Value::Null);
            let mut line = Vec::with_capacity(headers.len());
            if self.row_numbers {
                line.push((i + 1).to_string());
            }
            line.extend(self.columns.iter().map(|c| c.cell(&json)));
            if self.deletable {
                line.push("delete".to_string());
            }
            cells.push(line);
            ids.push(row.id().clone());
        }

        let empty = rows.is_empty().then(|| self.empty_message.clone());
        RenderedTable { headers, aligns, rows: cells, ids, empty }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub aligns: Vec<Align>,
    pub rows: Vec<Vec<String>>,
    /// Entity id per row, for click and delete handling.
    pub ids: Vec<EntityId>,
    /// Set when there are no rows.
    pub empty: Option<String>,
}

impl RenderedTable {
    pub fn column(&self, header: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == header)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Aligned plain-text layout for terminals.
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, &self.headers, &widths, &self.aligns);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths, &self.aligns);
        match &self.empty {
            Some(message) => {
                out.push_str(message);
                out.push('\n');
            }
            None => {
                for row in &self.rows {
                    push_line(&mut out, row, &widths, &self.aligns);
                }
            }
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize], aligns: &[Align]) {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(aligns)
        .map(|((cell, width), align)| pad(cell, *width, *align))
        .collect();
    out.push_str(parts.join(" | ").trim_end());
    out.push('\n');
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(cell.chars().count());
    match align {
        Align::Left => format!("{cell}{}", " ".repeat(fill)),
        Align::Right => format!("{}{cell}", " ".repeat(fill)),
        Align::Center => {
            let left = fill / 2;
            format!("{}{cell}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::geo::{ParentRef, Region};
    use models::LocalizedName;
    use serde_json::json;

    fn region(id: &str, name: &str, country: Option<&str>) -> Region {
        Region {
            id: EntityId::new(id),
            name: LocalizedName::new(name, name, name),
            country_id: EntityId::new("c1"),
            country: country.map(|c| ParentRef { id: EntityId::new("c1"), name: LocalizedName::new(c, c, c) }),
        }
    }

    fn table() -> Table {
        Table::new(vec![Column::new("Name (UZ)", "name.uz"), Column::new("Country", "country.name.uz")])
    }

    #[test]
    fn lookup_walks_nested_objects() {
        let v = json!({"a": {"b": {"c": 3}}});
        assert_eq!(lookup(&v, "a.b.c"), Some(&json!(3)));
        assert_eq!(lookup(&v, "a.x.c"), None);
    }

    #[test]
    fn missing_parent_renders_dash() {
        let rendered = table().render(&[region("r1", "Samarqand", Some("O'zbekiston")), region("r2", "Buxoro", None)]);
        assert_eq!(rendered.headers, vec!["#", "Name (UZ)", "Country", "Actions"]);
        assert_eq!(rendered.column("Country"), Some(vec!["O'zbekiston", "-"]));
        assert_eq!(rendered.column("#"), Some(vec!["1", "2"]));
        assert_eq!(rendered.ids[1].as_str(), "r2");
        assert!(rendered.empty.is_none());
    }

    #[test]
    fn empty_rows_carry_message() {
        let rendered = table().read_only().empty_message("No regions yet.").render::<Region>(&[]);
        assert_eq!(rendered.headers.last().map(String::as_str), Some("Country"));
        assert_eq!(rendered.empty.as_deref(), Some("No regions yet."));
        assert!(rendered.to_text().ends_with("No regions yet.\n"));
    }

    #[test]
    fn formatter_applies_to_present_values() {
        let t = Table::new(vec![Column::new("Name", "name").format_with(|v| {
            lookup(v, "en").and_then(Value::as_str).unwrap_or_default().to_uppercase()
        })])
        .without_row_numbers();
        let rendered = t.render(&[region("r1", "Samarqand", None)]);
        assert_eq!(rendered.rows[0][0], "SAMARQAND");
    }

    #[test]
    fn text_layout_aligns_columns() {
        let text = table().render(&[region("r1", "Samarqand", Some("UZ"))]).to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("# | Name (UZ) | Country | Actions"));
        assert!(lines[2].starts_with("1 | Samarqand | UZ"));
    }
}
