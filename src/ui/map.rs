use eframe::egui::{Stroke, Ui};
use egui_plot::{Line, Plot, PlotPoints, Polygon};

use crate::data::geo;
use crate::view::{DashboardView, MapFeatureView};

// ---------------------------------------------------------------------------
// Choropleth map
// ---------------------------------------------------------------------------

/// Draw every boundary feature filled by its poverty bucket. Hovering a
/// region shows its tooltip.
pub fn choropleth(ui: &mut Ui, view: &DashboardView, height: f32) {
    let response = Plot::new("choropleth")
        .height(height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            // Highlighted features last so their border sits on top.
            let (highlighted, plain): (Vec<&MapFeatureView>, Vec<&MapFeatureView>) =
                view.map.iter().partition(|f| f.style.weight > 1.0);
            for feature in plain.into_iter().chain(highlighted) {
                let style = &feature.style;

                // egui_plot fills polygons as convex shapes; district outlines
                // are not, so fill the earcut triangles instead.
                let fill = style.fill_color.to_color32_alpha(style.fill_opacity);
                for triangle in &feature.shape.triangles {
                    let points: PlotPoints = triangle.iter().copied().collect();
                    plot_ui.polygon(Polygon::new(points).fill_color(fill).stroke(Stroke::NONE));
                }

                let border = style.color.to_color32_alpha(style.opacity);
                for ring in geo::outlines(&feature.shape.geometry) {
                    plot_ui.line(
                        Line::new(PlotPoints::from(ring))
                            .color(border)
                            .width(style.weight),
                    );
                }
            }

            plot_ui
                .pointer_coordinate()
                .and_then(|p| view.feature_at([p.x, p.y]))
        });

    if let Some(feature) = response.inner {
        response.response.on_hover_text(feature.tooltip.as_str());
    }
}
