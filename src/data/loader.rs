use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::EventBatch;
use super::schema;
use crate::config::{EntryWindow, GraphConfig};

// ---------------------------------------------------------------------------
// Fatal error taxonomy
// ---------------------------------------------------------------------------

/// Fatal load failures. Either aborts the whole conversion before any output
/// is written; there is no partial or degraded loading.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("source {path} unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("source {path} missing expected branch '{branch}'")]
    SchemaMismatch { path: PathBuf, branch: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one event source into an [`EventBatch`]. Dispatch by extension.
///
/// Supported formats (one event per row, flat numeric branch columns named
/// per [`schema`]):
/// * `.parquet` – flat numeric columns (recommended)
/// * `.json`    – `[{ "jet1Pt": 123.4, ... }, ...]`
/// * `.csv`     – header row of branch names
///
/// The `[start, stop)` window is applied after the file is materialized,
/// clamped to the available row count.
pub fn load_file(path: &Path, cfg: &GraphConfig, window: EntryWindow) -> Result<EventBatch> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path, cfg)?,
        "json" => read_json(path, cfg)?,
        "csv" => read_csv(path, cfg)?,
        other => {
            return Err(ConvertError::SourceUnavailable {
                path: path.to_path_buf(),
                reason: format!("unsupported file extension: .{other}"),
            }
            .into());
        }
    };

    Ok(assemble(table, cfg, window))
}

// ---------------------------------------------------------------------------
// ColumnTable – format-independent intermediate
// ---------------------------------------------------------------------------

/// Branch name → one f64 per event. Every expected branch is present and
/// every column has `n_rows` entries once a format reader returns.
struct ColumnTable {
    columns: BTreeMap<String, Vec<f64>>,
    n_rows: usize,
}

impl ColumnTable {
    fn column(&self, name: &str) -> &[f64] {
        // Format readers populate every expected branch before returning.
        &self.columns[name]
    }
}

/// Gather the windowed per-branch scalars into per-event rows.
fn assemble(table: ColumnTable, cfg: &GraphConfig, window: EntryWindow) -> EventBatch {
    let range = window.resolve(table.n_rows);
    let n_events = range.len();

    let jet_rows_f64 = |template: &str| -> Vec<Vec<f64>> {
        let cols: Vec<&[f64]> = (1..=cfg.n_obj)
            .map(|i| table.column(&schema::branch(template, i)))
            .collect();
        range.clone().map(|row| cols.iter().map(|c| c[row]).collect()).collect()
    };
    let jet_rows_i64 = |template: &str| -> Vec<Vec<i64>> {
        let cols: Vec<&[f64]> = (1..=cfg.n_obj)
            .map(|i| table.column(&schema::branch(template, i)))
            .collect();
        range
            .clone()
            .map(|row| cols.iter().map(|c| c[row] as i64).collect())
            .collect()
    };
    let higgs_rows = |template: &str| -> Vec<Vec<f64>> {
        let cols: Vec<&[f64]> = (1..=cfg.n_parents)
            .map(|i| table.column(&schema::branch(template, i)))
            .collect();
        range.clone().map(|row| cols.iter().map(|c| c[row]).collect()).collect()
    };

    let batch = EventBatch {
        jet_pt: jet_rows_f64(schema::JET_PT),
        jet_eta: jet_rows_f64(schema::JET_ETA),
        jet_phi: jet_rows_f64(schema::JET_PHI),
        jet_btag: jet_rows_f64(schema::JET_BTAG),
        jet_id: jet_rows_f64(schema::JET_ID),
        jet_higgs_idx: jet_rows_i64(schema::JET_HIGGS_IDX),
        jet_hadron_flavor: jet_rows_i64(schema::JET_HADRON_FLAVOR),
        higgs_pt: higgs_rows(schema::HIGGS_PT),
        higgs_eta: higgs_rows(schema::HIGGS_ETA),
        higgs_phi: higgs_rows(schema::HIGGS_PHI),
    };
    debug_assert_eq!(batch.len(), n_events);
    batch
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

fn read_parquet(path: &Path, cfg: &GraphConfig) -> Result<ColumnTable> {
    let file = std::fs::File::open(path).map_err(|e| ConvertError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata of {}", path.display()))?;
    let reader = builder.build().context("building parquet reader")?;

    let expected = schema::all_branches(cfg.n_obj, cfg.n_parents);
    let mut columns: BTreeMap<String, Vec<f64>> = expected
        .iter()
        .map(|name| (name.clone(), Vec::new()))
        .collect();
    let mut n_rows = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let arrow_schema = batch.schema();
        n_rows += batch.num_rows();

        for name in &expected {
            let idx = arrow_schema.index_of(name).map_err(|_| ConvertError::SchemaMismatch {
                path: path.to_path_buf(),
                branch: name.clone(),
            })?;
            let col = batch.column(idx);
            extend_f64(columns.get_mut(name).unwrap(), col)
                .with_context(|| format!("branch '{name}' in {}", path.display()))?;
        }
    }

    Ok(ColumnTable { columns, n_rows })
}

/// Append an Arrow numeric column to a `Vec<f64>`, widening as needed.
fn extend_f64(out: &mut Vec<f64>, col: &Arc<dyn Array>) -> Result<()> {
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            out.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            out.extend(arr.iter().map(|v| v.map(f64::from).unwrap_or(f64::NAN)));
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            out.extend(arr.iter().map(|v| v.unwrap_or(0) as f64));
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            out.extend(arr.iter().map(|v| v.unwrap_or(0) as f64));
        }
        other => bail!("expected a numeric column, got {other:?}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "jet1Pt": 152.3, "jet1Eta": -0.4, ..., "genHiggs3Phi": 1.2 },
///   ...
/// ]
/// ```
fn read_json(path: &Path, cfg: &GraphConfig) -> Result<ColumnTable> {
    let text = std::fs::read_to_string(path).map_err(|e| ConvertError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let root: JsonValue =
        serde_json::from_str(&text).with_context(|| format!("parsing JSON {}", path.display()))?;
    let records = root.as_array().context("expected top-level JSON array")?;

    let expected = schema::all_branches(cfg.n_obj, cfg.n_parents);
    let mut columns: BTreeMap<String, Vec<f64>> = expected
        .iter()
        .map(|name| (name.clone(), Vec::with_capacity(records.len())))
        .collect();

    for (row, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("row {row} is not a JSON object"))?;
        for name in &expected {
            let val = obj.get(name).ok_or_else(|| ConvertError::SchemaMismatch {
                path: path.to_path_buf(),
                branch: name.clone(),
            })?;
            let num = val
                .as_f64()
                .with_context(|| format!("row {row}, '{name}': not a number"))?;
            columns.get_mut(name).unwrap().push(num);
        }
    }

    Ok(ColumnTable { columns, n_rows: records.len() })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row of branch names, one event per data row.
fn read_csv(path: &Path, cfg: &GraphConfig) -> Result<ColumnTable> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ConvertError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let expected = schema::all_branches(cfg.n_obj, cfg.n_parents);
    let mut indices = Vec::with_capacity(expected.len());
    for name in &expected {
        let idx = headers.iter().position(|h| h == name).ok_or_else(|| {
            ConvertError::SchemaMismatch {
                path: path.to_path_buf(),
                branch: name.clone(),
            }
        })?;
        indices.push(idx);
    }

    let mut columns: BTreeMap<String, Vec<f64>> =
        expected.iter().map(|name| (name.clone(), Vec::new())).collect();
    let mut n_rows = 0usize;

    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row}"))?;
        for (name, &idx) in expected.iter().zip(&indices) {
            let tok = record.get(idx).unwrap_or("");
            let num = tok
                .trim()
                .parse::<f64>()
                .with_context(|| format!("CSV row {row}, '{name}': '{tok}' is not a number"))?;
            columns.get_mut(name).unwrap().push(num);
        }
        n_rows += 1;
    }

    Ok(ColumnTable { columns, n_rows })
}
