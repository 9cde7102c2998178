use crate::data::geo::Boundaries;
use crate::data::loader::DataLoadError;
use crate::data::model::{ChartKind, Dataset, FilterSelection, RegionFilter};
use crate::view::DashboardView;

// ---------------------------------------------------------------------------
// Load events
// ---------------------------------------------------------------------------

/// Completion of one of the two independent startup loads.
#[derive(Debug)]
pub enum LoadEvent {
    Records(Result<Dataset, DataLoadError>),
    Boundaries(Result<Boundaries, DataLoadError>),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the dashboard state, independent of rendering.
///
/// Every trigger (year, region, chart kind) bumps `generation`; a view is
/// only installed if it was computed for the latest trigger, so the most
/// recent selection always wins.
#[derive(Debug, Default)]
pub struct Controller {
    dataset: Option<Dataset>,
    boundaries: Option<Boundaries>,

    records_error: Option<DataLoadError>,
    boundaries_error: Option<DataLoadError>,

    /// A slot replaced through File → Open; its startup result is stale.
    records_opened: bool,
    boundaries_opened: bool,

    selection: Option<FilterSelection>,
    chart_kind: ChartKind,

    generation: u64,
    view: Option<DashboardView>,

    /// Non-fatal message shown in the top bar.
    pub status_message: Option<String>,
}

impl Controller {
    pub fn new(chart_kind: ChartKind) -> Self {
        Self {
            chart_kind,
            ..Default::default()
        }
    }

    // -- loading --

    /// Ingest a startup load result. Either load may finish first; the first
    /// view is built once both are in. A failure is terminal. Results for a
    /// slot the user already replaced are dropped.
    pub fn handle_load(&mut self, event: LoadEvent) {
        let (slot, superseded) = match &event {
            LoadEvent::Records(_) => ("records", self.records_opened),
            LoadEvent::Boundaries(_) => ("boundaries", self.boundaries_opened),
        };
        if superseded {
            log::debug!("Ignoring startup {slot}: already replaced through File → Open");
            return;
        }

        match event {
            LoadEvent::Records(Ok(dataset)) => {
                if dataset.is_empty() {
                    log::warn!("Record dataset is empty");
                }
                self.selection = FilterSelection::initial(&dataset);
                self.dataset = Some(dataset);
            }
            LoadEvent::Records(Err(e)) => {
                log::error!("Failed to load records: {e}");
                self.records_error = Some(e);
            }
            LoadEvent::Boundaries(Ok(boundaries)) => {
                if boundaries.is_empty() {
                    log::warn!("Boundary file has no drawable features");
                }
                self.boundaries = Some(boundaries);
            }
            LoadEvent::Boundaries(Err(e)) => {
                log::error!("Failed to load boundaries: {e}");
                self.boundaries_error = Some(e);
            }
        }

        if self.load_error().is_some() {
            self.view = None;
            return;
        }
        if self.is_ready() && self.view.is_none() {
            self.refresh();
        }
    }

    /// Replace the dataset (File → Open). Selection resets to the first year.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.records_opened = true;
        self.records_error = None;
        self.selection = FilterSelection::initial(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.view = None;
        if self.is_ready() && self.load_error().is_none() {
            self.refresh();
        }
    }

    /// Replace the boundary set (File → Open boundaries).
    pub fn set_boundaries(&mut self, boundaries: Boundaries) {
        self.boundaries_opened = true;
        self.boundaries_error = None;
        self.boundaries = Some(boundaries);
        self.status_message = None;
        if self.is_ready() && self.load_error().is_none() {
            self.refresh();
        }
    }

    /// Both inputs are in memory.
    pub fn is_ready(&self) -> bool {
        self.dataset.is_some() && self.boundaries.is_some()
    }

    /// Still waiting on at least one load, with no failure so far.
    pub fn is_loading(&self) -> bool {
        !self.is_ready() && self.load_error().is_none()
    }

    pub fn load_error(&self) -> Option<&DataLoadError> {
        self.records_error.as_ref().or(self.boundaries_error.as_ref())
    }

    // -- triggers --

    /// Re-select and re-aggregate for `selection`, installing the result.
    pub fn on_filter_change(&mut self, selection: FilterSelection) -> Option<&DashboardView> {
        self.selection = Some(selection);
        self.refresh()
    }

    pub fn set_year(&mut self, year: i32) -> Option<&DashboardView> {
        let region = self
            .selection
            .as_ref()
            .map(|s| s.region.clone())
            .unwrap_or_default();
        self.on_filter_change(FilterSelection::new(year, region))
    }

    pub fn set_region(&mut self, region: RegionFilter) -> Option<&DashboardView> {
        let year = self.selection.as_ref()?.year;
        self.on_filter_change(FilterSelection::new(year, region))
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) -> Option<&DashboardView> {
        self.chart_kind = kind;
        self.refresh()
    }

    fn refresh(&mut self) -> Option<&DashboardView> {
        let view = self.prepare()?;
        self.apply(view);
        self.view.as_ref()
    }

    /// Register a new trigger and compute its view without installing it.
    pub fn prepare(&mut self) -> Option<DashboardView> {
        self.generation += 1;
        let dataset = self.dataset.as_ref()?;
        let boundaries = self.boundaries.as_ref()?;
        let selection = self.selection.as_ref()?;

        log::debug!(
            "Refresh #{}: year {}, region {}, {} chart",
            self.generation,
            selection.year,
            selection.region,
            self.chart_kind
        );
        Some(DashboardView::build(
            dataset,
            boundaries,
            selection,
            self.chart_kind,
            self.generation,
        ))
    }

    /// Install `view` unless a later trigger has superseded it.
    pub fn apply(&mut self, view: DashboardView) -> bool {
        if view.generation < self.generation {
            log::debug!(
                "Dropping stale view #{} (latest #{})",
                view.generation,
                self.generation
            );
            return false;
        }
        self.view = Some(view);
        true
    }

    // -- accessors --

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn selection(&self) -> Option<&FilterSelection> {
        self.selection.as_ref()
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart_kind
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};

    use crate::data::geo::BoundaryFeature;
    use crate::data::model::Record;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            Record::new("A", 2020, 10.0),
            Record::new("B", 2020, 20.0),
            Record::new("A", 2021, 5.0),
        ])
    }

    fn boundaries() -> Boundaries {
        let triangle = LineString::from(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        Boundaries::from_features(vec![BoundaryFeature::new(
            "a",
            MultiPolygon::new(vec![Polygon::new(triangle, vec![])]),
        )])
    }

    fn load_failure() -> DataLoadError {
        DataLoadError::Malformed {
            path: PathBuf::from("x.json"),
            detail: "bad".into(),
        }
    }

    fn ready_controller() -> Controller {
        let mut c = Controller::new(ChartKind::Bar);
        c.handle_load(LoadEvent::Records(Ok(dataset())));
        c.handle_load(LoadEvent::Boundaries(Ok(boundaries())));
        c
    }

    #[test]
    fn first_view_waits_for_both_loads_in_any_order() {
        let mut c = Controller::new(ChartKind::Bar);
        c.handle_load(LoadEvent::Boundaries(Ok(boundaries())));
        assert!(c.view().is_none());
        assert!(c.is_loading());
        c.handle_load(LoadEvent::Records(Ok(dataset())));
        let view = c.view().unwrap();
        assert_eq!(view.selection, FilterSelection::new(2020, RegionFilter::All));

        let mut c = Controller::new(ChartKind::Bar);
        c.handle_load(LoadEvent::Records(Ok(dataset())));
        assert!(c.view().is_none());
        c.handle_load(LoadEvent::Boundaries(Ok(boundaries())));
        assert!(c.view().is_some());
    }

    #[test]
    fn load_failure_is_terminal_without_partial_view() {
        let mut c = Controller::new(ChartKind::Bar);
        c.handle_load(LoadEvent::Records(Ok(dataset())));
        c.handle_load(LoadEvent::Boundaries(Err(load_failure())));
        assert!(c.view().is_none());
        assert!(!c.is_loading());
        assert!(c.load_error().is_some());
        assert!(c.set_year(2020).is_none());
    }

    #[test]
    fn filter_change_recomputes_view() {
        let mut c = ready_controller();
        let view = c
            .on_filter_change(FilterSelection::new(2020, RegionFilter::All))
            .unwrap();
        let agg = view.aggregate.as_ref().unwrap();
        assert_eq!(agg.mean, 15.0);
        assert_eq!(agg.highest.region, "B");

        let view = c.set_region(RegionFilter::Specific("B".into())).unwrap();
        assert_eq!(view.chart.labels, vec!["B"]);

        let view = c.set_year(2021).unwrap();
        assert!(view.aggregate.is_none());
        assert_eq!(
            view.selection,
            FilterSelection::new(2021, RegionFilter::Specific("B".into()))
        );
    }

    #[test]
    fn chart_kind_change_is_a_trigger() {
        let mut c = ready_controller();
        let before = c.view().unwrap().generation;
        let view = c.set_chart_kind(ChartKind::Pie).unwrap();
        assert_eq!(view.chart.kind, ChartKind::Pie);
        assert!(view.generation > before);
    }

    #[test]
    fn stale_view_does_not_overwrite_later_trigger() {
        let mut c = ready_controller();
        c.on_filter_change(FilterSelection::new(2020, RegionFilter::All));
        let early = c.prepare().unwrap();

        c.on_filter_change(FilterSelection::new(2021, RegionFilter::All));
        assert!(!c.apply(early));
        assert_eq!(c.view().unwrap().selection.year, 2021);
    }

    #[test]
    fn same_selection_twice_gives_same_content() {
        let mut c = ready_controller();
        let sel = FilterSelection::new(2020, RegionFilter::Specific("a".into()));
        let first = c.on_filter_change(sel.clone()).cloned().unwrap();
        let second = c.on_filter_change(sel).cloned().unwrap();
        assert_eq!(first.map, second.map);
        assert_eq!(first.chart, second.chart);
        assert_eq!(first.aggregate, second.aggregate);
    }

    #[test]
    fn reopening_dataset_resets_selection() {
        let mut c = ready_controller();
        c.set_year(2021);
        c.set_dataset(Dataset::from_records(vec![Record::new("C", 2015, 3.0)]));
        let view = c.view().unwrap();
        assert_eq!(view.selection, FilterSelection::new(2015, RegionFilter::All));
        assert_eq!(view.chart.labels, vec!["C"]);
    }

    #[test]
    fn late_startup_results_do_not_override_opened_files() {
        let mut c = Controller::new(ChartKind::Bar);
        c.handle_load(LoadEvent::Boundaries(Ok(boundaries())));
        c.set_dataset(Dataset::from_records(vec![Record::new("C", 2015, 3.0)]));
        assert!(c.view().is_some());

        // Startup records failing after the user opened a file.
        c.handle_load(LoadEvent::Records(Err(load_failure())));
        assert!(c.load_error().is_none());
        assert_eq!(c.view().unwrap().selection.year, 2015);

        // Startup records succeeding after the user opened a file.
        c.handle_load(LoadEvent::Records(Ok(dataset())));
        assert_eq!(c.dataset().unwrap().distinct_regions(), &["C".to_string()]);
        assert_eq!(c.selection().unwrap().year, 2015);
        assert_eq!(c.view().unwrap().selection.year, 2015);

        // Same for the boundary slot.
        c.set_boundaries(Boundaries::default());
        c.handle_load(LoadEvent::Boundaries(Err(load_failure())));
        assert!(c.load_error().is_none());
        assert!(c.view().unwrap().map.is_empty());
    }
}
