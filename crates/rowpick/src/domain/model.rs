//! Domain models for tabular data and row identity.

/// A single table row: an opaque identifier plus its rendered cell values.
///
/// Rows live in a stable, externally owned order. The identifier is unique
/// within a [`Dataset`] and is the only thing selection logic keys on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<String>,
}

impl TableRow {
    pub fn new(id: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            id: id.into(),
            cells,
        }
    }
}

/// A loaded table: column headers plus rows in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    /// Display name, usually the source file stem.
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
