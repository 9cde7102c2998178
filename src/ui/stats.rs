use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color;
use crate::data::filter::AggregateResult;
use crate::insight::{self, StatCards};

/// Average / highest / lowest cards.
pub fn stat_cards(ui: &mut Ui, cards: &StatCards) {
    ui.strong("Statistics");
    egui::Grid::new("stat_cards")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (label, value) in [
                ("Average", &cards.mean),
                ("Highest", &cards.highest),
                ("Lowest", &cards.lowest),
            ] {
                ui.label(label);
                ui.label(RichText::new(value.as_str()).strong().size(16.0));
                ui.end_row();
            }
        });
}

/// A framed insight paragraph.
pub fn insight_text(ui: &mut Ui, text: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(text);
    });
}

/// The records behind the current chart.
pub fn records_table(ui: &mut Ui, agg: Option<&AggregateResult>) {
    let Some(agg) = agg else {
        ui.label(insight::NO_DATA_TEXT);
        return;
    };

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder().at_least(140.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(90.0))
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("Region");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Year");
            });
            header.col(|ui: &mut Ui| {
                ui.strong("Poverty rate");
            });
        })
        .body(|mut body| {
            for rec in &agg.matched {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(rec.region.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(rec.year.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        let token = color::color_for(Some(rec.poverty_percent));
                        ui.label(
                            RichText::new(insight::format_percent(rec.poverty_percent))
                                .background_color(token.to_color32())
                                .color(token.contrast_text()),
                        );
                    });
                });
            }
        });
}
