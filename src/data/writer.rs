use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float64Builder, Int64Array, Int64Builder, ListArray, ListBuilder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::GraphRecord;

// ---------------------------------------------------------------------------
// Artifact layout
// ---------------------------------------------------------------------------
//
// One parquet row per graph record; row index is the record index and the
// file's row count is the collection length, so downstream consumers get
// random access and a stable total count.
//
// * `num_nodes`  Int64          – k
// * `x`          List<Float64>  – node features, row-major k × 5
// * `edge_index` List<Int64>    – 2 × E flattened: all sources, then all targets
// * `edge_attr`  List<Float64>  – edge features, row-major E × 7
// * `y`          List<Int64>    – edge labels, length E

const NODE_FEATURE_DIM: usize = 5;
const EDGE_FEATURE_DIM: usize = 7;

fn artifact_schema() -> Arc<Schema> {
    let float_list = |name: &str| {
        Field::new(
            name,
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        )
    };
    let int_list = |name: &str| {
        Field::new(
            name,
            DataType::List(Arc::new(Field::new("item", DataType::Int64, true))),
            false,
        )
    };
    Arc::new(Schema::new(vec![
        Field::new("num_nodes", DataType::Int64, false),
        float_list("x"),
        int_list("edge_index"),
        float_list("edge_attr"),
        int_list("y"),
    ]))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Persist the record collection as one parquet artifact.
///
/// The file is written to a `.tmp` sibling and renamed into place on
/// success, so an aborted run never leaves a partial artifact behind.
pub fn write_graph_file(path: &Path, records: &[GraphRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let mut num_nodes = Int64Builder::new();
    let mut x = ListBuilder::new(Float64Builder::new());
    let mut edge_index = ListBuilder::new(Int64Builder::new());
    let mut edge_attr = ListBuilder::new(Float64Builder::new());
    let mut y = ListBuilder::new(Int64Builder::new());

    for rec in records {
        num_nodes.append_value(rec.num_nodes() as i64);

        for row in &rec.node_features {
            x.values().append_slice(row);
        }
        x.append(true);

        for &(src, _) in &rec.edge_index {
            edge_index.values().append_value(src as i64);
        }
        for &(_, dst) in &rec.edge_index {
            edge_index.values().append_value(dst as i64);
        }
        edge_index.append(true);

        for row in &rec.edge_features {
            edge_attr.values().append_slice(row);
        }
        edge_attr.append(true);

        y.values().append_slice(&rec.edge_labels);
        y.append(true);
    }

    let schema = artifact_schema();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(num_nodes.finish()),
            Arc::new(x.finish()),
            Arc::new(edge_index.finish()),
            Arc::new(edge_attr.finish()),
            Arc::new(y.finish()),
        ],
    )
    .context("assembling output record batch")?;

    let tmp_path = path.with_extension("parquet.tmp");
    let file = std::fs::File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("moving artifact into place at {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading (verification and downstream spot checks)
// ---------------------------------------------------------------------------

/// Read an artifact back into memory, inverting [`write_graph_file`].
pub fn read_graph_file(path: &Path) -> Result<Vec<GraphRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening artifact {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading artifact metadata")?
        .build()
        .context("building artifact reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading artifact batch")?;
        let schema = batch.schema();

        let col = |name: &str| -> Result<usize> {
            schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("artifact missing '{name}' column"))
        };
        let num_nodes = batch
            .column(col("num_nodes")?)
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("'num_nodes' is not Int64")?
            .clone();
        let x = list_column(&batch, col("x")?)?;
        let edge_index = list_column(&batch, col("edge_index")?)?;
        let edge_attr = list_column(&batch, col("edge_attr")?)?;
        let y = list_column(&batch, col("y")?)?;

        for row in 0..batch.num_rows() {
            let k = num_nodes.value(row) as usize;
            let x_flat = f64_list_row(x, row)?;
            let idx_flat = i64_list_row(edge_index, row)?;
            let attr_flat = f64_list_row(edge_attr, row)?;
            let labels = i64_list_row(y, row)?;

            if x_flat.len() != k * NODE_FEATURE_DIM {
                bail!("record {row}: node feature length {} for {k} nodes", x_flat.len());
            }
            let n_edges = labels.len();
            if idx_flat.len() != 2 * n_edges || attr_flat.len() != n_edges * EDGE_FEATURE_DIM {
                bail!("record {row}: inconsistent edge array lengths");
            }

            let node_features = x_flat
                .chunks_exact(NODE_FEATURE_DIM)
                .map(|c| [c[0], c[1], c[2], c[3], c[4]])
                .collect();
            let (sources, targets) = idx_flat.split_at(n_edges);
            let edge_index = sources
                .iter()
                .zip(targets)
                .map(|(&s, &t)| (s as u32, t as u32))
                .collect();
            let edge_features = attr_flat
                .chunks_exact(EDGE_FEATURE_DIM)
                .map(|c| [c[0], c[1], c[2], c[3], c[4], c[5], c[6]])
                .collect();

            records.push(GraphRecord {
                node_features,
                edge_index,
                edge_features,
                edge_labels: labels,
            });
        }
    }
    Ok(records)
}

fn list_column(batch: &RecordBatch, idx: usize) -> Result<&ListArray> {
    batch
        .column(idx)
        .as_any()
        .downcast_ref::<ListArray>()
        .context("expected a List column")
}

fn f64_list_row(col: &ListArray, row: usize) -> Result<Vec<f64>> {
    let values = col.value(row);
    let arr = values
        .as_any()
        .downcast_ref::<arrow::array::Float64Array>()
        .context("expected Float64 list items")?;
    Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn i64_list_row(col: &ListArray, row: usize) -> Result<Vec<i64>> {
    let values = col.value(row);
    let arr = values
        .as_any()
        .downcast_ref::<Int64Array>()
        .context("expected Int64 list items")?;
    Ok(arr.iter().map(|v| v.unwrap_or(0)).collect())
}
