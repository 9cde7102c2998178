use std::collections::BTreeMap;

use super::model::{Dataset, Record, RegionFilter};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Return the records of `year` that pass the region filter, in dataset order.
/// An empty result is a valid outcome, not an error.
pub fn select(dataset: &Dataset, year: i32, region: &RegionFilter) -> Vec<Record> {
    dataset
        .records()
        .iter()
        .filter(|r| r.year == year && region.matches(r))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Descriptive statistics over a non-empty selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    /// Unrounded arithmetic mean of `poverty_percent`.
    pub mean: f64,
    pub highest: Record,
    pub lowest: Record,
    pub matched: Vec<Record>,
}

/// Summarise `records`. `None` when there is nothing to summarise; callers
/// show a "no data" state in that case.
///
/// Ties for highest/lowest resolve to the first occurrence in input order.
pub fn aggregate(records: &[Record]) -> Option<AggregateResult> {
    let first = records.first()?;

    let mut sum = 0.0;
    let mut highest = first;
    let mut lowest = first;
    for rec in records {
        sum += rec.poverty_percent;
        // Strict comparisons keep the earliest record on ties.
        if rec.poverty_percent > highest.poverty_percent {
            highest = rec;
        }
        if rec.poverty_percent < lowest.poverty_percent {
            lowest = rec;
        }
    }

    Some(AggregateResult {
        mean: sum / records.len() as f64,
        highest: highest.clone(),
        lowest: lowest.clone(),
        matched: records.to_vec(),
    })
}

/// Mean poverty rate per year over all regions, ascending by year.
/// The long-run trend deliberately ignores the region filter.
pub fn yearly_means(dataset: &Dataset) -> Vec<(i32, f64)> {
    let mut acc: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for rec in dataset.records() {
        let slot = acc.entry(rec.year).or_insert((0.0, 0));
        slot.0 += rec.poverty_percent;
        slot.1 += 1;
    }
    acc.into_iter()
        .map(|(year, (sum, n))| (year, sum / n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Dataset {
        Dataset::from_records(vec![
            Record::new("A", 2020, 10.0),
            Record::new("B", 2020, 20.0),
            Record::new("A", 2021, 5.0),
        ])
    }

    fn specific(name: &str) -> RegionFilter {
        RegionFilter::Specific(name.to_string())
    }

    #[test]
    fn scenario_all_regions() {
        let ds = scenario();
        let sel = select(&ds, 2020, &RegionFilter::All);
        assert_eq!(
            sel,
            vec![Record::new("A", 2020, 10.0), Record::new("B", 2020, 20.0)]
        );

        let agg = aggregate(&sel).unwrap();
        assert_eq!(agg.mean, 15.0);
        assert_eq!(agg.highest, Record::new("B", 2020, 20.0));
        assert_eq!(agg.lowest, Record::new("A", 2020, 10.0));
        assert_eq!(agg.matched, sel);
    }

    #[test]
    fn scenario_missing_region_is_empty_and_absent() {
        let ds = scenario();
        let sel = select(&ds, 2021, &specific("B"));
        assert!(sel.is_empty());
        assert!(aggregate(&sel).is_none());
    }

    #[test]
    fn select_is_idempotent() {
        let ds = scenario();
        for year in [2020, 2021, 2022] {
            for filter in [RegionFilter::All, specific("a"), specific("B")] {
                assert_eq!(select(&ds, year, &filter), select(&ds, year, &filter));
            }
        }
    }

    #[test]
    fn select_single_region_case_insensitive() {
        let ds = scenario();
        assert_eq!(
            select(&ds, 2021, &specific("a")),
            vec![Record::new("A", 2021, 5.0)]
        );
    }

    #[test]
    fn select_on_empty_dataset_is_empty() {
        assert!(select(&Dataset::default(), 2020, &RegionFilter::All).is_empty());
    }

    #[test]
    fn select_preserves_dataset_order() {
        let ds = Dataset::from_records(vec![
            Record::new("Zeta", 2020, 1.0),
            Record::new("Alpha", 2020, 2.0),
            Record::new("Mid", 2019, 3.0),
            Record::new("Beta", 2020, 4.0),
        ]);
        let regions: Vec<_> = select(&ds, 2020, &RegionFilter::All)
            .into_iter()
            .map(|r| r.region)
            .collect();
        assert_eq!(regions, vec!["Zeta", "Alpha", "Beta"]);
    }

    #[test]
    fn ties_resolve_to_first_occurrence() {
        let recs = vec![
            Record::new("First", 2020, 7.0),
            Record::new("Second", 2020, 7.0),
            Record::new("Low1", 2020, 1.0),
            Record::new("Low2", 2020, 1.0),
            Record::new("High2", 2020, 7.0),
        ];
        let agg = aggregate(&recs).unwrap();
        assert_eq!(agg.highest.region, "First");
        assert_eq!(agg.lowest.region, "Low1");
    }

    #[test]
    fn mean_matches_arithmetic_mean_for_every_year() {
        let ds = Dataset::from_records(vec![
            Record::new("A", 2010, 12.5),
            Record::new("B", 2010, 7.25),
            Record::new("C", 2010, 3.0),
            Record::new("A", 2011, 11.0),
            Record::new("B", 2011, 6.5),
        ]);
        for &year in ds.distinct_years() {
            let values: Vec<f64> = ds
                .records()
                .iter()
                .filter(|r| r.year == year)
                .map(|r| r.poverty_percent)
                .collect();
            let expected = values.iter().sum::<f64>() / values.len() as f64;
            let agg = aggregate(&select(&ds, year, &RegionFilter::All)).unwrap();
            assert!((agg.mean - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn yearly_means_are_ascending_and_ignore_region() {
        let ds = Dataset::from_records(vec![
            Record::new("A", 2010, 2.0),
            Record::new("A", 2012, 6.0),
            Record::new("B", 2011, 3.0),
            Record::new("B", 2012, 8.0),
            Record::new("B", 2010, 4.0),
        ]);
        assert_eq!(
            yearly_means(&ds),
            vec![(2010, 3.0), (2011, 3.0), (2012, 7.0)]
        );
    }

    #[test]
    fn yearly_means_of_empty_dataset() {
        assert!(yearly_means(&Dataset::default()).is_empty());
    }
}
