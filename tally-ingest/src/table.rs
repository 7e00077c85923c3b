//! Minimal column-ordered table of string cells.
//!
//! A cell is `Option<String>`: `None` is a missing value (renders as an
//! empty CSV field), `Some("")` is a present-but-blank source cell. The two
//! coerce differently in the normalizer, so the distinction is load-bearing.

use anyhow::{Result, bail};

pub type Cell = Option<String>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a column with one value per existing row.
    pub fn push_column(&mut self, name: &str, cells: Vec<Cell>) -> Result<()> {
        if cells.len() != self.rows.len() {
            bail!(
                "column {name:?} has {} cells, table has {} rows",
                cells.len(),
                self.rows.len()
            );
        }
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(())
    }

    /// Append a column holding the same value in every row. Used to stamp
    /// per-file metadata (account name/number, institution) onto all rows.
    pub fn push_constant_column(&mut self, name: &str, value: &str) {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Some(value.to_string()));
        }
    }

    /// Append another table's rows, taking the union of columns. Columns new
    /// to the accumulator are added at the end and backfilled with missing
    /// values; rows from `other` are reordered into the accumulator's column
    /// order. Column order stays first-seen, so canonical tables keep the
    /// standard columns in front.
    pub fn append(&mut self, other: Table) {
        if self.columns.is_empty() {
            *self = other;
            return;
        }
        for column in &other.columns {
            if self.column_index(column).is_none() {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push(None);
                }
            }
        }
        for row in other.rows {
            let mut mapped = vec![None; self.columns.len()];
            for (j, cell) in row.into_iter().enumerate() {
                let target = self
                    .column_index(&other.columns[j])
                    .expect("column added above");
                mapped[target] = cell;
            }
            self.rows.push(mapped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Cell {
        Some(s.to_string())
    }

    #[test]
    fn test_push_row_arity_checked() {
        let mut t = Table::new(vec!["a".into(), "b".into()]);
        assert!(t.push_row(vec![some("1")]).is_err());
        assert!(t.push_row(vec![some("1"), None]).is_ok());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_append_takes_column_union() {
        let mut acc = Table::new(vec!["a".into(), "b".into()]);
        acc.push_row(vec![some("1"), some("2")]).unwrap();

        let mut extra = Table::new(vec!["a".into(), "b".into(), "c".into()]);
        extra.push_row(vec![some("3"), some("4"), some("5")]).unwrap();

        acc.append(extra);
        assert_eq!(acc.columns, vec!["a", "b", "c"]);
        assert_eq!(acc.rows[0], vec![some("1"), some("2"), None]);
        assert_eq!(acc.rows[1], vec![some("3"), some("4"), some("5")]);
    }

    #[test]
    fn test_append_into_empty_accumulator() {
        let mut acc = Table::default();
        let mut t = Table::new(vec!["a".into()]);
        t.push_row(vec![some("1")]).unwrap();
        acc.append(t);
        assert_eq!(acc.columns, vec!["a"]);
        assert_eq!(acc.len(), 1);
    }
}
