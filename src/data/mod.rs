/// Data layer: core types, loading, joining and aggregation.
///
/// Architecture:
/// ```text
///  records .json / .csv / .parquet        boundaries .geojson
///        │                                      │
///        ▼                                      ▼
///   ┌──────────┐                          ┌──────────┐
///   │  loader   │  parse → Dataset         │   geo     │  parse → Boundaries
///   └──────────┘                          └──────────┘
///        │                                      │
///        ▼                                      │
///   ┌──────────┐                                │
///   │  filter   │  select / aggregate ─────────┤
///   └──────────┘                                ▼
///                                      join on region name (case-insensitive)
/// ```

pub mod filter;
pub mod geo;
pub mod loader;
pub mod model;
