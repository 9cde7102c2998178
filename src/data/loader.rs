use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use thiserror::Error;

use super::geo::Boundaries;
use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to bring one of the two input files into memory.
/// A load failure is terminal for the session.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("cannot read {}: {source}", path.display())]
    Unreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {detail}", path.display())]
    Malformed { path: PathBuf, detail: String },

    #[error("unsupported file extension .{extension} for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },
}

impl DataLoadError {
    fn malformed(path: &Path, err: anyhow::Error) -> Self {
        DataLoadError::Malformed {
            path: path.to_path_buf(),
            detail: format!("{err:#}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the poverty record dataset.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "kabupaten": ..., "tahun": ..., "persentase_miskin": ... }, ...]`
/// * `.csv`     – header `kabupaten,tahun,persentase_miskin`
/// * `.parquet` – columns with the same names
pub fn load_records(path: &Path) -> Result<Dataset, DataLoadError> {
    let ext = extension(path);
    let parsed = match ext.as_str() {
        "json" => {
            let text = read_text(path)?;
            parse_json_records(&text)
        }
        "csv" => {
            let text = read_text(path)?;
            parse_csv_records(&text)
        }
        "parquet" | "pq" => {
            let file = std::fs::File::open(path).map_err(|source| DataLoadError::Unreachable {
                path: path.to_path_buf(),
                source,
            })?;
            parse_parquet_records(file)
        }
        _ => {
            return Err(DataLoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            })
        }
    };

    let dataset = parsed.map_err(|e| DataLoadError::malformed(path, e))?;
    log::info!(
        "Loaded {} records ({} years, {} regions) from {}",
        dataset.len(),
        dataset.distinct_years().len(),
        dataset.distinct_regions().len(),
        path.display()
    );
    Ok(dataset)
}

/// Load the GeoJSON boundary collection (`.geojson` or `.json`).
pub fn load_boundaries(path: &Path) -> Result<Boundaries, DataLoadError> {
    let text = read_text(path)?;
    let boundaries = Boundaries::from_geojson_str(&text)
        .context("parsing GeoJSON FeatureCollection")
        .map_err(|e| DataLoadError::malformed(path, e))?;
    log::info!(
        "Loaded {} boundary features from {}",
        boundaries.len(),
        path.display()
    );
    Ok(boundaries)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn read_text(path: &Path) -> Result<String, DataLoadError> {
    std::fs::read_to_string(path).map_err(|source| DataLoadError::Unreachable {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn parse_json_records(text: &str) -> Result<Dataset> {
    Dataset::from_json_str(text)
        .context("expected a JSON array of {kabupaten, tahun, persentase_miskin}")
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn parse_csv_records(text: &str) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let records = reader
        .deserialize()
        .enumerate()
        // Line 1 is the header.
        .map(|(row_no, row)| row.with_context(|| format!("CSV line {}", row_no + 2)))
        .collect::<Result<Vec<Record>>>()?;
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Expected schema:
/// - `kabupaten`: Utf8 / LargeUtf8
/// - `tahun`: Int32 / Int64
/// - `persentase_miskin`: Float32 / Float64 (integers are accepted too)
fn parse_parquet_records(file: std::fs::File) -> Result<Dataset> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let region_col = column(&batch, "kabupaten")?;
        let year_col = column(&batch, "tahun")?;
        let percent_col = column(&batch, "persentase_miskin")?;

        for row in 0..batch.num_rows() {
            let region = extract_string(region_col, row)
                .with_context(|| format!("Row {row}: failed to read 'kabupaten'"))?;
            let year = extract_i64(year_col, row)
                .with_context(|| format!("Row {row}: failed to read 'tahun'"))?;
            let poverty_percent = extract_f64(percent_col, row)
                .with_context(|| format!("Row {row}: failed to read 'persentase_miskin'"))?;
            let year = i32::try_from(year)
                .with_context(|| format!("Row {row}: year {year} out of range"))?;

            records.push(Record {
                region,
                year,
                poverty_percent,
            });
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("expected Utf8 column, got {other:?}"),
    }
}

fn extract_i64(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            Ok(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.value(row))
        }
        other => bail!("expected integer column, got {other:?}"),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            Ok(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            Ok(arr.value(row))
        }
        DataType::Int32 | DataType::Int64 => extract_i64(col, row).map(|v| v as f64),
        other => bail!("expected numeric column, got {other:?}"),
    }
}
