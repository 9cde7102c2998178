use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::config::{DashboardConfig, DataConfig};
use crate::data::loader;
use crate::state::{Controller, LoadEvent};
use crate::ui::{map, panels, plot, stats};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PovertyDashboardApp {
    pub state: Controller,
    loader: Option<Receiver<LoadEvent>>,
}

impl PovertyDashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &DashboardConfig) -> Self {
        Self {
            state: Controller::new(config.chart.default_kind),
            loader: Some(spawn_loaders(cc.egui_ctx.clone(), &config.data)),
        }
    }

    /// Drain finished loads into the controller.
    fn poll_loads(&mut self) {
        let Some(rx) = &self.loader else {
            return;
        };
        loop {
            match rx.try_recv() {
                Ok(event) => self.state.handle_load(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.loader = None;
                    break;
                }
            }
        }
    }
}

/// Start both input loads on their own threads. They finish in any order;
/// each result arrives as one `LoadEvent`.
fn spawn_loaders(ctx: egui::Context, data: &DataConfig) -> Receiver<LoadEvent> {
    let (tx, rx) = channel();

    let records_path = data.records_path.clone();
    let records_tx = tx.clone();
    let records_ctx = ctx.clone();
    thread::spawn(move || {
        let event = LoadEvent::Records(loader::load_records(&records_path));
        records_tx.send(event).ok();
        records_ctx.request_repaint();
    });

    let boundaries_path = data.boundaries_path.clone();
    thread::spawn(move || {
        let event = LoadEvent::Boundaries(loader::load_boundaries(&boundaries_path));
        tx.send(event).ok();
        ctx.request_repaint();
    });

    rx
}

impl eframe::App for PovertyDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loads();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        if let Some(err) = self.state.load_error() {
            let message = format!("Failed to load data: {err}");
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.label(RichText::new(message).color(Color32::RED).size(16.0));
                });
            });
            return;
        }

        if self.state.view().is_none() {
            let loading = self.state.is_loading();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui: &mut Ui| {
                    if loading {
                        ui.spinner();
                    } else {
                        ui.heading("The dataset has no records  (File → Open records…)");
                    }
                });
            });
            return;
        }

        // ---- Left side panel: filters, legend, stats ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map, charts, insights ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(view) = self.state.view() else {
                return;
            };
            let chart_height = (ui.available_height() * 0.45).max(260.0);
            egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                ui.columns(2, |cols| {
                    cols[0].heading(format!("Poverty map {}", view.selection.year));
                    map::choropleth(&mut cols[0], view, chart_height);
                    stats::insight_text(&mut cols[0], &view.map_insight);

                    plot::selection_chart(&mut cols[1], &view.chart, chart_height);
                    stats::insight_text(&mut cols[1], &view.chart_insight);
                });
                ui.separator();
                ui.columns(2, |cols| {
                    plot::trend_chart(&mut cols[0], &view.trend, chart_height * 0.7);
                    stats::insight_text(&mut cols[0], &view.map_insight);
                    stats::records_table(&mut cols[1], view.aggregate.as_ref());
                });
            });
        });
    }
}
