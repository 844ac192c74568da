//! Exporting selected rows.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::app::selection::SelectionState;
use crate::domain::model::Dataset;
use crate::infra::config::Config;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// CSV with the dataset's headers.
    Csv,
    /// JSON array of header-keyed objects.
    Json,
}

impl ExportFormat {
    /// Recommended file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`ExportFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ExportFormatParseError {
    #[error("unknown export format '{0}'")]
    UnknownFormat(String),
}

/// Runtime options controlling export behavior.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub output_path: Option<PathBuf>,
}

impl ExportOptions {
    /// Derive options from configuration defaults.
    pub fn from_config(config: &Config) -> Result<Self> {
        let format = config
            .defaults
            .export_format
            .parse()
            .context("invalid export_format in configuration")?;
        Ok(Self {
            format,
            output_path: None,
        })
    }
}

/// Writes the currently selected rows, in dataset order, to disk.
#[derive(Debug, Default)]
pub struct Exporter;

impl Exporter {
    pub fn new() -> Self {
        Self
    }

    /// Export the selection. Returns the path written to.
    pub fn export(
        &self,
        dataset: &Dataset,
        selection: &SelectionState,
        options: &ExportOptions,
    ) -> Result<PathBuf> {
        let path = match &options.output_path {
            Some(path) => path.clone(),
            None => default_output_path(dataset, options.format)?,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create export directory {}", dir.display()))?;
        }

        let rows: Vec<_> = dataset
            .rows
            .iter()
            .filter(|row| selection.is_selected(&row.id))
            .collect();

        match options.format {
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                writer
                    .write_record(&dataset.headers)
                    .context("failed to write headers")?;
                for row in rows {
                    writer
                        .write_record(&row.cells)
                        .with_context(|| format!("failed to write row {}", row.id))?;
                }
                writer.flush().context("failed to flush export")?;
            }
            ExportFormat::Json => {
                let objects: Vec<Value> = rows
                    .iter()
                    .map(|row| {
                        let mut object = Map::new();
                        for (header, cell) in dataset.headers.iter().zip(&row.cells) {
                            object.insert(header.clone(), Value::String(cell.clone()));
                        }
                        Value::Object(object)
                    })
                    .collect();
                let data = serde_json::to_string_pretty(&objects)
                    .context("failed to serialize export")?;
                fs::write(&path, data)
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
        }

        Ok(path)
    }
}

fn default_output_path(dataset: &Dataset, format: ExportFormat) -> Result<PathBuf> {
    let timestamp = OffsetDateTime::now_utc()
        .format(format_description!(
            "[year][month][day]-[hour][minute][second]"
        ))
        .context("failed to format export timestamp")?;
    Ok(PathBuf::from(".rowpick/exports").join(format!(
        "{}-{timestamp}.{}",
        dataset.name,
        format.extension()
    )))
}
