use serde_json::{Map, Value};

use super::Participant;

/// Participant rows gathered from one or more listing pages.
///
/// Columns are the union of the keys of every row, in first-seen order.
/// A row lacking a column simply has no value for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticipantTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl ParticipantTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from the `items` array of one page.
    ///
    /// Returns the offending item if it is not a JSON object.
    pub fn from_items(items: Vec<Value>) -> Result<Self, Value> {
        let mut table = Self::new();
        for item in items {
            match item {
                Value::Object(row) => table.push_row(row),
                other => return Err(other),
            }
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Map<String, Value>) {
        for key in row.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Concatenate another table's rows below this one's
    pub fn append(&mut self, other: ParticipantTable) {
        for row in other.rows {
            self.push_row(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Values of one column, `None` where a row lacks it
    pub fn column(&self, name: &str) -> Option<Vec<Option<&Value>>> {
        if !self.columns.iter().any(|c| c == name) {
            return None;
        }
        Some(self.rows.iter().map(|row| row.get(name)).collect())
    }

    /// Typed participant records, one per row
    pub fn participants(&self) -> Result<Vec<Participant>, serde_json::Error> {
        self.rows
            .iter()
            .map(|row| serde_json::from_value(Value::Object(row.clone())))
            .collect()
    }

    /// Render as tab-separated text with a header line
    pub fn to_tsv(&self) -> String {
        let mut out = self.columns.join("\t");
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| row.get(c).map(tsv_cell).unwrap_or_default())
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }
}

fn tsv_cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace(['\t', '\n', '\r'], " ")
}
