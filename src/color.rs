use std::str::FromStr;

use eframe::egui::Color32;
use palette::{IntoColor, Lab, Srgb};

// ---------------------------------------------------------------------------
// Color tokens
// ---------------------------------------------------------------------------

/// A hex colour (`#RRGGBB`) handed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorToken(&'static str);

impl ColorToken {
    pub const fn new(hex: &'static str) -> Self {
        Self(hex)
    }

    fn rgb(&self) -> Option<Srgb<u8>> {
        Srgb::<u8>::from_str(self.0).ok()
    }

    /// Convert for egui painting. Unparseable tokens fall back to gray.
    pub fn to_color32(&self) -> Color32 {
        self.rgb()
            .map(|c| Color32::from_rgb(c.red, c.green, c.blue))
            .unwrap_or(Color32::GRAY)
    }

    /// Same colour with the given alpha (0.0 – 1.0).
    pub fn to_color32_alpha(&self, alpha: f32) -> Color32 {
        let c = self.to_color32();
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), a)
    }

    /// Black or white, whichever reads better on this colour.
    pub fn contrast_text(&self) -> Color32 {
        if self.lightness() > 60.0 {
            Color32::BLACK
        } else {
            Color32::WHITE
        }
    }

    /// CIE L* lightness (0 = black, 100 = white).
    pub fn lightness(&self) -> f32 {
        match self.rgb() {
            Some(c) => {
                let lab: Lab = c.into_format::<f32>().into_color();
                lab.l
            }
            None => 0.0,
        }
    }
}

pub const NO_DATA: ColorToken = ColorToken::new("#D3D3D3");
pub const BORDER: ColorToken = ColorToken::new("#FFFFFF");
pub const HIGHLIGHT_BORDER: ColorToken = ColorToken::new("#333333");
pub const TREND_LINE: ColorToken = ColorToken::new("#2B7A78");

// ---------------------------------------------------------------------------
// Poverty color scale
// ---------------------------------------------------------------------------

/// Upper bounds (inclusive) of every bucket but the last.
pub const THRESHOLDS: [f64; 6] = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0];

/// Bucket colours from least to most severe.
pub const BUCKETS: [ColorToken; 7] = [
    ColorToken::new("#FFEDA0"),
    ColorToken::new("#FEB24C"),
    ColorToken::new("#FD8D3C"),
    ColorToken::new("#FC4E2A"),
    ColorToken::new("#E31A1C"),
    ColorToken::new("#BD0026"),
    ColorToken::new("#800026"),
];

/// Bucket index for a percentage: `[0,2]` is 0, `(2,4]` is 1, ..., `>12` is 6.
/// `None` (no matching record) has no severity.
pub fn severity(percent: Option<f64>) -> Option<usize> {
    percent.map(|p| THRESHOLDS.iter().filter(|&&t| p > t).count())
}

/// Colour for a poverty percentage; `None` gets the no-data colour.
pub fn color_for(percent: Option<f64>) -> ColorToken {
    match severity(percent) {
        Some(idx) => BUCKETS[idx],
        None => NO_DATA,
    }
}

/// Legend rows (`"0–2"`, ..., `"12+"`) with their bucket colour.
pub fn legend_entries() -> Vec<(String, ColorToken)> {
    let mut lower = 0.0;
    BUCKETS
        .iter()
        .enumerate()
        .map(|(i, &token)| {
            let label = match THRESHOLDS.get(i) {
                Some(&upper) => {
                    let label = format!("{lower}–{upper}");
                    lower = upper;
                    label
                }
                None => format!("{lower}+"),
            };
            (label, token)
        })
        .collect()
}
