//! Everything the rendering adapters draw, derived from
//! `Dataset + Boundaries + FilterSelection + ChartKind`.

use crate::color::{self, ColorToken};
use crate::data::filter::{AggregateResult, aggregate, select, yearly_means};
use crate::data::geo::{Boundaries, BoundaryFeature};
use crate::data::model::{ChartKind, Dataset, FilterSelection, RegionFilter, normalize_region};
use crate::insight::{self, StatCards};

// ---------------------------------------------------------------------------
// Map layer
// ---------------------------------------------------------------------------

/// Per-feature paint parameters of the choropleth.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStyle {
    pub fill_color: ColorToken,
    pub weight: f32,
    pub opacity: f32,
    pub color: ColorToken,
    pub fill_opacity: f32,
}

impl FeatureStyle {
    fn new(percent: Option<f64>, highlighted: bool) -> Self {
        Self {
            fill_color: color::color_for(percent),
            weight: if highlighted { 3.0 } else { 1.0 },
            opacity: 1.0,
            color: if highlighted {
                color::HIGHLIGHT_BORDER
            } else {
                color::BORDER
            },
            fill_opacity: if highlighted { 1.0 } else { 0.8 },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapFeatureView {
    pub name: String,
    pub shape: BoundaryFeature,
    pub style: FeatureStyle,
    pub tooltip: String,
}

impl MapFeatureView {
    pub fn contains(&self, point: [f64; 2]) -> bool {
        self.shape.contains(point)
    }
}

fn tooltip(name: &str, percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{name}\nPoverty rate: {p}%"),
        None => format!("{name}\nNo data available"),
    }
}

/// Join every boundary feature against the year's records
/// (case-insensitive on the region name).
pub fn map_layer(
    dataset: &Dataset,
    boundaries: &Boundaries,
    selection: &FilterSelection,
) -> Vec<MapFeatureView> {
    boundaries
        .features()
        .iter()
        .map(|feature| {
            let percent = dataset
                .find(&feature.name, selection.year)
                .map(|r| r.poverty_percent);
            let highlighted = match &selection.region {
                RegionFilter::All => false,
                RegionFilter::Specific(name) => {
                    normalize_region(name) == normalize_region(&feature.name)
                }
            };
            MapFeatureView {
                name: feature.name.clone(),
                shape: feature.clone(),
                style: FeatureStyle::new(percent, highlighted),
                tooltip: tooltip(&feature.name, percent),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Bar / pie input: one entry per selected record.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<ColorToken>,
}

/// Long-run trend input: mean per year over all regions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendSeries {
    pub labels: Vec<i32>,
    pub values: Vec<f64>,
}

impl TrendSeries {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let (labels, values) = yearly_means(dataset).into_iter().unzip();
        Self { labels, values }
    }
}

// ---------------------------------------------------------------------------
// Full view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Trigger order this view was computed for.
    pub generation: u64,
    pub selection: FilterSelection,
    pub map: Vec<MapFeatureView>,
    pub chart: ChartSeries,
    pub trend: TrendSeries,
    pub aggregate: Option<AggregateResult>,
    pub stats: StatCards,
    pub map_insight: String,
    pub chart_insight: String,
}

impl DashboardView {
    /// Pure function of its inputs: the same arguments always give the same view.
    pub fn build(
        dataset: &Dataset,
        boundaries: &Boundaries,
        selection: &FilterSelection,
        kind: ChartKind,
        generation: u64,
    ) -> Self {
        let records = select(dataset, selection.year, &selection.region);
        let agg = aggregate(&records);
        let year_agg = match selection.region {
            RegionFilter::All => agg.clone(),
            RegionFilter::Specific(_) => {
                aggregate(&select(dataset, selection.year, &RegionFilter::All))
            }
        };

        let chart = ChartSeries {
            kind,
            title: format!("Poverty rate ({})", selection.year),
            labels: records.iter().map(|r| r.region.clone()).collect(),
            values: records.iter().map(|r| r.poverty_percent).collect(),
            colors: records
                .iter()
                .map(|r| color::color_for(Some(r.poverty_percent)))
                .collect(),
        };

        Self {
            generation,
            selection: selection.clone(),
            map: map_layer(dataset, boundaries, selection),
            chart,
            trend: TrendSeries::from_dataset(dataset),
            stats: StatCards::from_aggregate(agg.as_ref()),
            map_insight: insight::year_insight(selection.year, year_agg.as_ref()),
            chart_insight: insight::selection_insight(selection, agg.as_ref()),
            aggregate: agg,
        }
    }

    /// Map feature under `point` (map coordinates). Holes belong to
    /// whatever region fills them, not the enclosing one.
    pub fn feature_at(&self, point: [f64; 2]) -> Option<&MapFeatureView> {
        self.map.iter().find(|f| f.contains(point))
    }
}
