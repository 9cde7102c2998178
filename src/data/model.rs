use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record – one (region, year) observation
// ---------------------------------------------------------------------------

/// A single poverty observation for one region in one year.
///
/// Field names on the wire follow the published dataset
/// (`kabupaten`, `tahun`, `persentase_miskin`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "kabupaten")]
    pub region: String,
    #[serde(rename = "tahun")]
    pub year: i32,
    #[serde(rename = "persentase_miskin")]
    pub poverty_percent: f64,
}

impl Record {
    pub fn new(region: impl Into<String>, year: i32, poverty_percent: f64) -> Self {
        Self {
            region: region.into(),
            year,
            poverty_percent,
        }
    }

    /// Case-insensitive comparison of this record's region against `name`.
    pub fn region_matches(&self, name: &str) -> bool {
        normalize_region(&self.region) == normalize_region(name)
    }
}

/// Normalise a region name for joining: both sides are lowercased before
/// comparison, so "KOTA BANDUNG" and "Kota Bandung" are the same region.
pub fn normalize_region(name: &str) -> String {
    name.to_lowercase()
}

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// Region restriction of a selection. A region literally named "all" is
/// `Specific("all")`, never confused with `All`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Specific(String),
}

impl RegionFilter {
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Specific(name) => record.region_matches(name),
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => write!(f, "All regions"),
            RegionFilter::Specific(name) => write!(f, "{name}"),
        }
    }
}

/// The user's current (year, region) choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub year: i32,
    pub region: RegionFilter,
}

impl FilterSelection {
    pub fn new(year: i32, region: RegionFilter) -> Self {
        Self { year, region }
    }

    /// First year of the dataset, all regions. `None` for an empty dataset.
    pub fn initial(dataset: &Dataset) -> Option<Self> {
        dataset
            .distinct_years()
            .first()
            .map(|&year| Self::new(year, RegionFilter::All))
    }
}

// ---------------------------------------------------------------------------
// Chart kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Bar => write!(f, "Bar"),
            ChartKind::Pie => write!(f, "Pie"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded record set
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct years and regions.
/// Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    years: Vec<i32>,
    regions: Vec<String>,
}

impl Dataset {
    /// Build the distinct-value indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
        let regions: BTreeSet<String> = records.iter().map(|r| r.region.clone()).collect();
        Dataset {
            records,
            years: years.into_iter().collect(),
            regions: regions.into_iter().collect(),
        }
    }

    /// Parse a JSON array of records.
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        let records: Vec<Record> = serde_json::from_str(raw)?;
        Ok(Self::from_records(records))
    }

    /// All records, in load order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct years, ascending.
    pub fn distinct_years(&self) -> &[i32] {
        &self.years
    }

    /// Distinct region names, lexicographically sorted.
    pub fn distinct_regions(&self) -> &[String] {
        &self.regions
    }

    /// First record for `region` (case-insensitive) in `year`.
    pub fn find(&self, region: &str, year: i32) -> Option<&Record> {
        let key = normalize_region(region);
        self.records
            .iter()
            .find(|r| r.year == year && normalize_region(&r.region) == key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            Record::new("Kota Bandung", 2012, 4.5),
            Record::new("Bogor", 2010, 9.0),
            Record::new("Kota Bandung", 2010, 4.9),
            Record::new("Bogor", 2011, 8.8),
            Record::new("Bekasi", 2012, 5.2),
        ])
    }

    #[test]
    fn distinct_years_are_ascending_and_deduplicated() {
        assert_eq!(sample().distinct_years(), &[2010, 2011, 2012]);
    }

    #[test]
    fn distinct_regions_are_sorted_and_deduplicated() {
        assert_eq!(
            sample().distinct_regions(),
            &["Bekasi".to_string(), "Bogor".to_string(), "Kota Bandung".to_string()]
        );
    }

    #[test]
    fn parses_dataset_field_names() {
        let raw = r#"[
            {"kabupaten": "Bogor", "tahun": 2010, "persentase_miskin": 9.0},
            {"kabupaten": "Depok", "tahun": 2010, "persentase_miskin": 2}
        ]"#;
        let ds = Dataset::from_json_str(raw).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1], Record::new("Depok", 2010, 2.0));
    }

    #[test]
    fn rejects_wrong_record_shape() {
        assert!(Dataset::from_json_str(r#"[{"kabupaten": "Bogor"}]"#).is_err());
        assert!(Dataset::from_json_str(r#"{"kabupaten": "Bogor"}"#).is_err());
    }

    #[test]
    fn find_is_case_insensitive() {
        let ds = sample();
        let rec = ds.find("KOTA BANDUNG", 2010).unwrap();
        assert_eq!(rec.poverty_percent, 4.9);
        assert!(ds.find("kota bandung", 2011).is_none());
    }

    #[test]
    fn region_named_all_is_not_the_all_filter() {
        let rec = Record::new("All", 2020, 1.0);
        let other = Record::new("Bogor", 2020, 1.0);
        let specific = RegionFilter::Specific("all".into());
        assert!(specific.matches(&rec));
        assert!(!specific.matches(&other));
        assert!(RegionFilter::All.matches(&other));
    }

    #[test]
    fn initial_selection_uses_first_year() {
        let sel = FilterSelection::initial(&sample()).unwrap();
        assert_eq!(sel, FilterSelection::new(2010, RegionFilter::All));
        assert!(FilterSelection::initial(&Dataset::default()).is_none());
    }
}
