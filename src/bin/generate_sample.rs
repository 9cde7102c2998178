use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

/// SplitMix64: small, seedable, good enough for fake survey numbers.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[lo, hi)`.
    fn between(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    }

    /// Year-to-year survey noise: sum of three uniforms, roughly bell-shaped
    /// around zero.
    fn jitter(&mut self, spread: f64) -> f64 {
        (0..3).map(|_| self.between(-spread, spread)).sum::<f64>() / 3.0
    }
}

const REGIONS: [&str; 18] = [
    "Bogor",
    "Sukabumi",
    "Cianjur",
    "Bandung",
    "Garut",
    "Tasikmalaya",
    "Ciamis",
    "Kuningan",
    "Cirebon",
    "Majalengka",
    "Sumedang",
    "Indramayu",
    "Subang",
    "Purwakarta",
    "Karawang",
    "Bekasi",
    "Kota Bandung",
    "Kota Depok",
];

const FIRST_YEAR: i32 = 2010;
const LAST_YEAR: i32 = 2024;

/// Grid cell of region `i`: a 0.3° square, six per row, laid out from the
/// north-west corner of the province.
fn cell(i: usize) -> Vec<[f64; 2]> {
    let size = 0.3;
    let lon = 106.4 + (i % 6) as f64 * size;
    let lat = -6.0 - (i / 6) as f64 * size;
    vec![
        [lon, lat],
        [lon + size, lat],
        [lon + size, lat - size],
        [lon, lat - size],
        [lon, lat],
    ]
}

fn main() {
    let mut rng = SampleRng(42);

    let mut all_region: Vec<String> = Vec::new();
    let mut all_year: Vec<i32> = Vec::new();
    let mut all_percent: Vec<f64> = Vec::new();

    for region in &REGIONS {
        let base = rng.between(2.0, 14.0);
        let decline = rng.between(0.05, 0.35);
        for year in FIRST_YEAR..=LAST_YEAR {
            let t = (year - FIRST_YEAR) as f64;
            let value = (base - decline * t + rng.jitter(0.5)).max(0.0);
            all_region.push(region.to_string());
            all_year.push(year);
            all_percent.push((value * 100.0).round() / 100.0);
        }
    }

    // ---- JSON records ----
    let records: Vec<serde_json::Value> = all_region
        .iter()
        .zip(&all_year)
        .zip(&all_percent)
        .map(|((region, year), percent)| {
            json!({ "kabupaten": region, "tahun": year, "persentase_miskin": percent })
        })
        .collect();
    let json_path = "sample_kemiskinan.json";
    let text = serde_json::to_string_pretty(&records).expect("Failed to serialize records");
    std::fs::write(json_path, text).expect("Failed to write JSON records");

    // ---- Parquet records ----
    let schema = Arc::new(Schema::new(vec![
        Field::new("kabupaten", DataType::Utf8, false),
        Field::new("tahun", DataType::Int32, false),
        Field::new("persentase_miskin", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                all_region.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(all_year.clone())),
            Arc::new(Float64Array::from(all_percent.clone())),
        ],
    )
    .expect("Failed to create RecordBatch");

    let parquet_path = "sample_kemiskinan.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // ---- GeoJSON boundaries (upper-case names exercise the case-insensitive join) ----
    let features: Vec<serde_json::Value> = REGIONS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "type": "Feature",
                "properties": { "VARNAME_2": name.to_uppercase() },
                "geometry": { "type": "Polygon", "coordinates": [cell(i)] }
            })
        })
        .collect();
    let geojson = json!({ "type": "FeatureCollection", "features": features });
    let geojson_path = "sample_regions.geojson";
    std::fs::write(geojson_path, geojson.to_string()).expect("Failed to write GeoJSON");

    println!(
        "Wrote {} records ({} regions, {FIRST_YEAR}–{LAST_YEAR}) to {json_path} and {parquet_path}, \
         boundaries to {geojson_path}",
        all_region.len(),
        REGIONS.len()
    );
    println!(
        "Point the dashboard at them with poverty-dashboard.toml:\n\
         [data]\nrecords_path = \"{json_path}\"\nboundaries_path = \"{geojson_path}\""
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SampleRng(7);
        let mut b = SampleRng(7);
        assert!((0..16).all(|_| a.next_u64() == b.next_u64()));
    }

    #[test]
    fn draws_stay_in_range() {
        let mut rng = SampleRng(42);
        for _ in 0..1000 {
            let x = rng.between(2.0, 14.0);
            assert!((2.0..14.0).contains(&x));
            assert!(rng.jitter(0.5).abs() <= 0.5);
        }
    }
}
