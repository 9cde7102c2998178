use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color;
use crate::data::model::ChartKind;
use crate::view::{ChartSeries, TrendSeries};

// ---------------------------------------------------------------------------
// Bar / pie chart of the current selection
// ---------------------------------------------------------------------------

pub fn selection_chart(ui: &mut Ui, chart: &ChartSeries, height: f32) {
    ui.strong(chart.title.as_str());
    if let Some(text) = placeholder(chart) {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(text);
        });
        return;
    }
    match chart.kind {
        ChartKind::Bar => bar_chart(ui, chart, height),
        ChartKind::Pie => pie_chart(ui, chart, height),
    }
}

fn bar_chart(ui: &mut Ui, chart: &ChartSeries, height: f32) {
    let bars: Vec<Bar> = chart
        .values
        .iter()
        .zip(&chart.labels)
        .zip(&chart.colors)
        .enumerate()
        .map(|(i, ((&value, label), token))| {
            Bar::new(i as f64, value)
                .name(label)
                .fill(token.to_color32())
                .width(0.8)
        })
        .collect();

    let labels = chart.labels.clone();
    Plot::new("selection_bar_chart")
        .height(height)
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .y_axis_label("%")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&chart.title));
        });
}

/// Text shown instead of a chart that would draw nothing.
fn placeholder(chart: &ChartSeries) -> Option<&'static str> {
    if chart.values.is_empty() {
        Some("No data for this selection")
    } else if chart.kind == ChartKind::Pie && pie_slices(&chart.values).is_empty() {
        Some("No data: every value in this selection is 0%")
    } else {
        None
    }
}

fn pie_chart(ui: &mut Ui, chart: &ChartSeries, height: f32) {
    let slices = pie_slices(&chart.values);
    let size = height.min(ui.available_width() * 0.6).max(80.0);

    ui.horizontal(|ui: &mut Ui| {
        let (response, painter) = ui.allocate_painter(egui::vec2(size, size), Sense::hover());
        let center = response.rect.center();
        let radius = size * 0.48;

        for (&(start, end), token) in slices.iter().zip(&chart.colors) {
            for shape in wedge(center, radius, start, end, token.to_color32()) {
                painter.add(shape);
            }
        }

        if let Some(pos) = response.hover_pos() {
            let d = pos - center;
            if d.length() <= radius {
                let turn = (d.y.atan2(d.x) / TAU).rem_euclid(1.0);
                if let Some(i) = slices.iter().position(|&(s, e)| turn >= s && turn < e) {
                    response.on_hover_text(format!(
                        "{}: {}",
                        chart.labels[i],
                        crate::insight::format_percent(chart.values[i])
                    ));
                }
            }
        }

        // Legend
        egui::ScrollArea::vertical()
            .id_salt("pie_legend")
            .max_height(size)
            .show(ui, |ui: &mut Ui| {
                for (label, token) in chart.labels.iter().zip(&chart.colors) {
                    ui.horizontal(|ui: &mut Ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                        ui.painter().rect_filled(rect, 2.0, token.to_color32());
                        ui.label(label.as_str());
                    });
                }
            });
    });
}

/// Cumulative `[start, end)` fractions of a full turn per value.
/// Non-positive totals yield no slices.
pub fn pie_slices(values: &[f64]) -> Vec<(f32, f32)> {
    let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut start = 0.0;
    values
        .iter()
        .map(|&v| {
            let end = start + (v.max(0.0) / total) as f32;
            let slice = (start, end);
            start = end;
            slice
        })
        .collect()
}

/// Convex pieces (at most 1/32 turn each) approximating one slice.
fn wedge(center: Pos2, radius: f32, start: f32, end: f32, fill: Color32) -> Vec<Shape> {
    const MAX_STEP: f32 = 1.0 / 32.0;
    let mut shapes = Vec::new();
    let mut a = start;
    while a < end {
        let b = (a + MAX_STEP).min(end);
        let at = |t: f32| center + radius * egui::vec2((t * TAU).cos(), (t * TAU).sin());
        shapes.push(Shape::convex_polygon(
            vec![center, at(a), at((a + b) / 2.0), at(b)],
            fill,
            Stroke::NONE,
        ));
        a = b;
    }
    shapes.push(Shape::line_segment(
        [center, center + radius * egui::vec2((start * TAU).cos(), (start * TAU).sin())],
        Stroke::new(1.0, Color32::WHITE),
    ));
    shapes
}

// ---------------------------------------------------------------------------
// Long-run trend
// ---------------------------------------------------------------------------

pub fn trend_chart(ui: &mut Ui, trend: &TrendSeries, height: f32) {
    ui.strong("Average poverty rate per year");
    let points: Vec<[f64; 2]> = trend
        .labels
        .iter()
        .zip(&trend.values)
        .map(|(&year, &mean)| [year as f64, mean])
        .collect();

    let color = color::TREND_LINE.to_color32();
    Plot::new("trend_chart")
        .height(height)
        .legend(Legend::default())
        .include_y(0.0)
        .x_axis_label("Year")
        .y_axis_label("%")
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_formatter(|mark, _range| {
            if mark.value.fract() == 0.0 {
                format!("{}", mark.value as i64)
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Average poverty rate")
                    .color(color)
                    .width(2.0)
                    .fill(0.0),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).color(color).radius(3.0));
        });
}
