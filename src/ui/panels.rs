use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color;
use crate::data::loader;
use crate::data::model::{ChartKind, RegionFilter};
use crate::state::Controller;
use crate::ui::stats;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut Controller) {
    ui.heading("Filters");
    ui.separator();

    let (Some(dataset), Some(selection)) = (state.dataset(), state.selection()) else {
        ui.label("No dataset loaded.");
        return;
    };

    // Copy what we need so we can mutate state after the widgets.
    let years = dataset.distinct_years().to_vec();
    let regions = dataset.distinct_regions().to_vec();
    let mut year = selection.year;
    let mut region = selection.region.clone();
    let mut kind = state.chart_kind();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Year ----
            ui.strong("Year");
            egui::ComboBox::from_id_salt("year")
                .selected_text(year.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for y in &years {
                        ui.selectable_value(&mut year, *y, y.to_string());
                    }
                });
            ui.add_space(6.0);

            // ---- Region ----
            ui.strong("Region");
            egui::ComboBox::from_id_salt("region")
                .selected_text(region.to_string())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut region, RegionFilter::All, "All regions");
                    for name in &regions {
                        ui.selectable_value(
                            &mut region,
                            RegionFilter::Specific(name.clone()),
                            name.as_str(),
                        );
                    }
                });
            ui.add_space(6.0);

            // ---- Chart kind ----
            ui.strong("Chart");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut kind, ChartKind::Bar, "Bar");
                ui.radio_value(&mut kind, ChartKind::Pie, "Pie");
            });
            ui.separator();

            legend(ui);
            ui.separator();

            if let Some(view) = state.view() {
                stats::stat_cards(ui, &view.stats);
            }
        });

    // Each control is an independent trigger.
    if Some(year) != state.selection().map(|s| s.year) {
        state.set_year(year);
    }
    if Some(&region) != state.selection().map(|s| &s.region) {
        state.set_region(region);
    }
    if kind != state.chart_kind() {
        state.set_chart_kind(kind);
    }
}

/// Colour legend of the poverty scale.
pub fn legend(ui: &mut Ui) {
    ui.strong("Poverty rate (%)");
    let mut rows = color::legend_entries();
    rows.push(("No data".to_string(), color::NO_DATA));
    for (label, token) in rows {
        ui.horizontal(|ui: &mut Ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(18.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, token.to_color32());
            ui.label(label);
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut Controller) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open records…").clicked() {
                open_records_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open boundaries…").clicked() {
                open_boundaries_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.dataset() {
            let matched = state
                .view()
                .and_then(|v| v.aggregate.as_ref())
                .map_or(0, |a| a.matched.len());
            ui.label(format!(
                "{} records loaded, {} selected",
                ds.len(),
                matched
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_records_dialog(state: &mut Controller) {
    let file = rfd::FileDialog::new()
        .set_title("Open poverty records")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_records(&path) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load records: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn open_boundaries_dialog(state: &mut Controller) {
    let file = rfd::FileDialog::new()
        .set_title("Open region boundaries")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_boundaries(&path) {
            Ok(boundaries) => state.set_boundaries(boundaries),
            Err(e) => {
                log::error!("Failed to load boundaries: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
