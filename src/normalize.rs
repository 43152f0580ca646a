// Column-name cleanup and cell coercion for a freshly read source table.
//
// `normalize` never drops rows and never fails: a numeric cell that does not
// parse becomes `None` and is counted, nothing more.
use crate::util::parse_f64_safe;
use std::collections::{BTreeMap, HashMap};

/// A delimited source exactly as read: header names and text cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
}

/// A source table with trimmed column names and typed columns.
#[derive(Debug, Clone)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    row_count: usize,
    coercion_failures: BTreeMap<String, usize>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Cell of a text column. `None` for empty cells, unknown columns, and
    /// columns that were coerced to numbers.
    pub fn text(&self, column: &str, row: usize) -> Option<&str> {
        match self.columns.get(*self.index.get(column)?)? {
            Column::Text(cells) => cells.get(row)?.as_deref(),
            Column::Number(_) => None,
        }
    }

    /// Cell of a numeric column. `None` for missing cells, unknown columns,
    /// and columns that were not declared numeric.
    pub fn number(&self, column: &str, row: usize) -> Option<f64> {
        match self.columns.get(*self.index.get(column)?)? {
            Column::Number(cells) => cells.get(row).copied().flatten(),
            Column::Text(_) => None,
        }
    }

    /// Non-empty cells that failed numeric coercion, per column.
    pub fn coercion_failures(&self) -> &BTreeMap<String, usize> {
        &self.coercion_failures
    }

    pub fn total_coercion_failures(&self) -> usize {
        self.coercion_failures.values().sum()
    }
}

/// Trim every column name and coerce the declared numeric columns.
///
/// Declared columns that are absent from the header are ignored here; the
/// loader decides which columns are required.
pub fn normalize(raw: RawTable, numeric_columns: &[&str]) -> Table {
    let names: Vec<String> = raw
        .headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut index = HashMap::new();
    for (i, name) in names.iter().enumerate() {
        // First occurrence wins when a header repeats.
        index.entry(name.clone()).or_insert(i);
    }

    let row_count = raw.records.len();
    let mut coercion_failures = BTreeMap::new();
    let columns = names
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let cells = raw.records.iter().map(|rec| {
                rec.get(col)
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
            });
            if numeric_columns.contains(&name.as_str()) {
                let mut failures = 0usize;
                let values = cells
                    .map(|cell| {
                        let v = parse_f64_safe(cell);
                        if cell.is_some() && v.is_none() {
                            failures += 1;
                        }
                        v
                    })
                    .collect();
                if failures > 0 {
                    *coercion_failures.entry(name.clone()).or_insert(0) += failures;
                }
                Column::Number(values)
            } else {
                Column::Text(cells.map(|c| c.map(str::to_string)).collect())
            }
        })
        .collect();

    Table {
        names,
        columns,
        index,
        row_count,
        coercion_failures,
    }
}
