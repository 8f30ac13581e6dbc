//! Chart specifications handed to the renderer: the national trend line and
//! the prefecture choropleth, plus the continuous color scales behind it.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::{data::PopulationRecord, map_draw::MapView};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const fn rgb(r: u8, g: u8, b: u8) -> Rgb {
    Rgb { r, g, b }
}

const BLUES: [Rgb; 9] = [
    rgb(247, 251, 255),
    rgb(222, 235, 247),
    rgb(198, 219, 239),
    rgb(158, 202, 225),
    rgb(107, 174, 214),
    rgb(66, 146, 198),
    rgb(33, 113, 181),
    rgb(8, 81, 156),
    rgb(8, 48, 107),
];

const GREENS: [Rgb; 9] = [
    rgb(247, 252, 245),
    rgb(229, 245, 224),
    rgb(199, 233, 192),
    rgb(161, 217, 155),
    rgb(116, 196, 118),
    rgb(65, 171, 93),
    rgb(35, 139, 69),
    rgb(0, 109, 44),
    rgb(0, 68, 27),
];

const REDS: [Rgb; 9] = [
    rgb(255, 245, 240),
    rgb(254, 224, 210),
    rgb(252, 187, 161),
    rgb(252, 146, 114),
    rgb(251, 106, 74),
    rgb(239, 59, 44),
    rgb(203, 24, 29),
    rgb(165, 15, 21),
    rgb(103, 0, 13),
];

const PORTLAND: [Rgb; 5] = [
    rgb(12, 51, 131),
    rgb(10, 136, 186),
    rgb(242, 211, 56),
    rgb(242, 143, 56),
    rgb(217, 30, 30),
];

const SPEED: [Rgb; 7] = [
    rgb(255, 253, 205),
    rgb(225, 205, 115),
    rgb(170, 172, 32),
    rgb(95, 146, 12),
    rgb(24, 115, 40),
    rgb(20, 75, 42),
    rgb(23, 35, 19),
];

const ELECTRIC: [Rgb; 6] = [
    rgb(0, 0, 0),
    rgb(30, 0, 100),
    rgb(120, 0, 100),
    rgb(160, 90, 0),
    rgb(230, 200, 0),
    rgb(255, 250, 220),
];

/// Palettes offered by the color theme selector.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ColorTheme {
    #[default]
    Blues,
    #[strum(serialize = "blues_r")]
    #[serde(rename = "blues_r")]
    BluesR,
    Greens,
    Reds,
    Portland,
    Speed,
    Electric,
}

impl ColorTheme {
    /// Color stops from the low end of the scale to the high end.
    pub fn stops(self) -> Vec<Rgb> {
        match self {
            Self::Blues => BLUES.to_vec(),
            Self::BluesR => BLUES.iter().rev().copied().collect(),
            Self::Greens => GREENS.to_vec(),
            Self::Reds => REDS.to_vec(),
            Self::Portland => PORTLAND.to_vec(),
            Self::Speed => SPEED.to_vec(),
            Self::Electric => ELECTRIC.to_vec(),
        }
    }
}

/// Linear interpolation over a theme's stops between `min` and `max`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContinuousScale {
    pub theme: ColorTheme,
    pub min: f64,
    pub max: f64,
    stops: Vec<Rgb>,
}

impl ContinuousScale {
    /// A range that is empty, inverted or not finite is widened to
    /// `min..min + 1`.
    pub fn new(theme: ColorTheme, min: f64, max: f64) -> Self {
        let min = if min.is_finite() { min } else { 0.0 };
        let span = max - min;
        let max = if span.is_finite() && span > 0.0 { max } else { min + 1.0 };
        Self { theme, min, max, stops: theme.stops() }
    }

    pub fn color_at(&self, value: f64) -> Rgb {
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        let t = if t.is_nan() { 0.0 } else { t };
        let segments = self.stops.len() - 1;
        #[allow(clippy::cast_precision_loss)]
        let pos = t * segments as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = (pos.floor() as usize).min(segments - 1);
        #[allow(clippy::cast_precision_loss)]
        let frac = pos - idx as f64;
        lerp(self.stops[idx], self.stops[idx + 1], frac)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
    rgb(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub year: i32,
    pub total: u64,
}

/// Single-series line chart of the national total.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendSpec {
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub series_name: &'static str,
    pub points: Vec<TrendPoint>,
    /// Years are laid out as categories, not on a numeric axis.
    pub x_axis_type: &'static str,
    pub range_slider: bool,
    pub fixed_range: bool,
}

impl TrendSpec {
    pub fn total_bounds(&self) -> Option<(u64, u64)> {
        let min = self.points.iter().map(|p| p.total).min()?;
        let max = self.points.iter().map(|p| p.total).max()?;
        Some((min, max))
    }
}

pub fn build_national_trend_spec(series: &[(i32, u64)]) -> TrendSpec {
    TrendSpec {
        title: "Japan Population Growth",
        x_title: "Year",
        y_title: "Total Population",
        series_name: "Total Population",
        points: series
            .iter()
            .map(|&(year, total)| TrendPoint { year, total })
            .collect(),
        x_axis_type: "category",
        range_slider: true,
        fixed_range: true,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoroplethCell {
    pub prefecture: String,
    pub prefecture_code: Option<String>,
    pub population: u64,
    pub color: Rgb,
    /// Whether the boundary file has a shape for `prefecture_code`.
    pub has_boundary: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChoroplethSpec {
    pub feature_id_key: &'static str,
    pub colorbar_title: &'static str,
    pub range: (f64, f64),
    pub scale: ContinuousScale,
    pub cells: Vec<ChoroplethCell>,
}

impl ChoroplethSpec {
    pub fn color_of(&self, prefecture_code: &str) -> Option<Rgb> {
        self.cells
            .iter()
            .find(|c| c.prefecture_code.as_deref() == Some(prefecture_code))
            .map(|c| c.color)
    }
}

/// Colors each prefecture of `slice` on a `0..=max population` scale.
pub fn build_choropleth_spec(
    slice: &[&PopulationRecord],
    shapes: &MapView,
    theme: ColorTheme,
) -> ChoroplethSpec {
    let max = slice.iter().map(|r| r.population).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let scale = ContinuousScale::new(theme, 0.0, max as f64);

    let cells: Vec<ChoroplethCell> = slice
        .iter()
        .map(|r| {
            let code = r.prefecture_code().map(str::to_string);
            let has_boundary = code.as_deref().is_some_and(|c| shapes.has_feature(c));
            if !has_boundary {
                log::debug!("No boundary shape for {} ({code:?})", r.prefecture);
            }
            #[allow(clippy::cast_precision_loss)]
            let color = scale.color_at(r.population as f64);
            ChoroplethCell {
                prefecture: r.prefecture.clone(),
                prefecture_code: code,
                population: r.population,
                color,
                has_boundary,
            }
        })
        .collect();

    ChoroplethSpec {
        feature_id_key: "properties.id",
        colorbar_title: "Population",
        range: (scale.min, scale.max),
        scale,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PrefectureMeta, SeriesKind};
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn rec(prefecture: &str, code: &str, population: u64) -> PopulationRecord {
        PopulationRecord {
            prefecture: prefecture.to_string(),
            meta: Some(PrefectureMeta {
                region: "Tohoku".to_string(),
                region_code: "2".to_string(),
                prefecture_code: code.to_string(),
            }),
            year: 2020,
            population,
            kind: SeriesKind::Actual,
        }
    }

    #[test]
    fn theme_names_round_trip() {
        let names: Vec<String> = ColorTheme::iter().map(|t| t.to_string()).collect();
        assert_eq!(
            names,
            vec!["blues", "blues_r", "greens", "reds", "portland", "speed", "electric"]
        );
        assert_eq!(ColorTheme::from_str("blues_r").unwrap(), ColorTheme::BluesR);
        assert!(ColorTheme::from_str("viridis").is_err());
    }

    #[test]
    fn scale_ends_hit_first_and_last_stop() {
        let scale = ContinuousScale::new(ColorTheme::Reds, 0.0, 100.0);
        assert_eq!(scale.color_at(0.0), REDS[0]);
        assert_eq!(scale.color_at(100.0), REDS[8]);
        assert_eq!(scale.color_at(250.0), REDS[8]);
        assert_eq!(scale.color_at(-5.0), REDS[0]);
    }

    #[test]
    fn reversed_theme_flips_the_scale() {
        let scale = ContinuousScale::new(ColorTheme::BluesR, 0.0, 1.0);
        assert_eq!(scale.color_at(0.0), BLUES[8]);
        assert_eq!(scale.color_at(1.0), BLUES[0]);
    }

    #[test]
    fn midpoint_interpolates() {
        let scale = ContinuousScale::new(ColorTheme::Electric, 0.0, 10.0);
        // halfway between stops 2 and 3 of six
        let c = scale.color_at(5.0);
        assert_eq!(c, rgb(140, 45, 50));
    }

    #[test]
    fn degenerate_range_is_widened() {
        let scale = ContinuousScale::new(ColorTheme::Blues, 0.0, 0.0);
        assert!((scale.max - 1.0).abs() < f64::EPSILON);
        let scale = ContinuousScale::new(ColorTheme::Blues, 5.0, f64::NAN);
        assert!((scale.max - 6.0).abs() < f64::EPSILON);
        assert_eq!(scale.color_at(f64::NAN), BLUES[0]);
    }

    #[test]
    fn equal_populations_do_not_break_the_choropleth() {
        let a = rec("Aomori", "JP02", 1_000);
        let b = rec("Iwate", "JP03", 1_000);
        let spec = build_choropleth_spec(&[&a, &b], &MapView::default(), ColorTheme::Greens);
        assert_eq!(spec.range, (0.0, 1_000.0));
        assert_eq!(spec.cells.len(), 2);
        assert_eq!(spec.cells[0].color, GREENS[8]);
        assert_eq!(spec.color_of("JP03"), Some(GREENS[8]));
        assert!(!spec.cells[0].has_boundary);
    }

    #[test]
    fn empty_and_zero_slices_are_clamped() {
        let spec = build_choropleth_spec(&[], &MapView::default(), ColorTheme::Speed);
        assert_eq!(spec.range, (0.0, 1.0));
        let zero = rec("Akita", "JP05", 0);
        let spec = build_choropleth_spec(&[&zero], &MapView::default(), ColorTheme::Speed);
        assert_eq!(spec.cells[0].color, SPEED[0]);
    }

    #[test]
    fn trend_spec_shape() {
        let spec = build_national_trend_spec(&[(1975, 100), (1976, 110)]);
        assert_eq!(spec.points.len(), 2);
        assert_eq!(spec.points[1], TrendPoint { year: 1976, total: 110 });
        assert_eq!(spec.x_axis_type, "category");
        assert!(spec.range_slider && spec.fixed_range);
        assert_eq!(spec.total_bounds(), Some((100, 110)));
        assert_eq!(build_national_trend_spec(&[]).total_bounds(), None);
    }
}
