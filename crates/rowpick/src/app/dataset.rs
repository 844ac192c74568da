//! Loading tabular data into a [`Dataset`].

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::errors::DomainError;
use crate::domain::model::{Dataset, TableRow};

/// How row identifiers are assigned while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdSource {
    /// 1-based record position, as a string.
    #[default]
    Ordinal,
    /// Values of the named column. Duplicates are rejected: selection state
    /// keys on the id, so two rows sharing one would toggle together.
    Column(String),
}

/// Options controlling CSV parsing.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub id_source: IdSource,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            id_source: IdSource::Ordinal,
        }
    }
}

/// Load a dataset from a CSV file on disk.
pub fn load_csv_path(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let file = File::open(path)
        .with_context(|| format!("failed to open data file {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    load_csv(file, name, options)
        .with_context(|| format!("failed to load {}", path.display()))
}

/// Parse CSV from any reader. The first record supplies the headers.
pub fn load_csv<R: Read>(reader: R, name: String, options: &LoadOptions) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("failed to read CSV headers")?
        .iter()
        .map(str::to_owned)
        .collect();

    let id_column = match &options.id_source {
        IdSource::Ordinal => None,
        IdSource::Column(column) => {
            let index = headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| DomainError::UnknownIdColumn(column.clone()))?;
            Some(index)
        }
    };

    let mut rows = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to parse record {}", index + 1))?;
        if record.len() != headers.len() {
            return Err(DomainError::RaggedRecord {
                row: index + 1,
                got: record.len(),
                expected: headers.len(),
            }
            .into());
        }

        let cells: Vec<String> = record.iter().map(str::to_owned).collect();
        let id = match id_column {
            None => (index + 1).to_string(),
            Some(column) => cells[column].clone(),
        };
        if !seen_ids.insert(id.clone()) {
            return Err(DomainError::DuplicateRowId(id).into());
        }
        rows.push(TableRow::new(id, cells));
    }

    Ok(Dataset {
        name,
        headers,
        rows,
    })
}
