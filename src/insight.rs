use crate::data::filter::AggregateResult;
use crate::data::model::FilterSelection;

/// Shown wherever an aggregate is absent.
pub const NO_DATA_TEXT: &str = "No data";

/// Percentages are shown with two decimals.
pub fn format_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Map / trend insight: the year's picture over all regions.
pub fn year_insight(year: i32, agg: Option<&AggregateResult>) -> String {
    match agg {
        Some(a) => format!(
            "In {year} the average poverty rate was {}. \
             The highest rate was in {} ({}), the lowest in {} ({}).",
            format_percent(a.mean),
            a.highest.region,
            format_percent(a.highest.poverty_percent),
            a.lowest.region,
            format_percent(a.lowest.poverty_percent),
        ),
        None => format!("No data available for {year}."),
    }
}

/// Chart insight for the current selection.
pub fn selection_insight(selection: &FilterSelection, agg: Option<&AggregateResult>) -> String {
    let Some(a) = agg else {
        return format!(
            "No data available for {} in {}.",
            selection.region, selection.year
        );
    };
    if a.matched.len() == 1 {
        return format!(
            "In {} the poverty rate of {} was {}.",
            selection.year,
            a.highest.region,
            format_percent(a.highest.poverty_percent)
        );
    }
    format!(
        "In {} the average poverty rate across {} regions was {}. \
         Highest: {} ({}); lowest: {} ({}).",
        selection.year,
        a.matched.len(),
        format_percent(a.mean),
        a.highest.region,
        format_percent(a.highest.poverty_percent),
        a.lowest.region,
        format_percent(a.lowest.poverty_percent),
    )
}

/// The three statistic cards (average / highest / lowest).
#[derive(Debug, Clone, PartialEq)]
pub struct StatCards {
    pub mean: String,
    pub highest: String,
    pub lowest: String,
}

impl StatCards {
    pub fn from_aggregate(agg: Option<&AggregateResult>) -> Self {
        match agg {
            Some(a) => Self {
                mean: format_percent(a.mean),
                highest: format_percent(a.highest.poverty_percent),
                lowest: format_percent(a.lowest.poverty_percent),
            },
            None => Self {
                mean: NO_DATA_TEXT.to_string(),
                highest: NO_DATA_TEXT.to_string(),
                lowest: NO_DATA_TEXT.to_string(),
            },
        }
    }
}
