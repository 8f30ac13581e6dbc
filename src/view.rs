//! Everything shown for one (year, theme) selection, computed from scratch
//! on every change.

use serde::Serialize;

use crate::{
    aggregate::{self, PrefectureDelta},
    charts::{self, ChoroplethSpec, ColorTheme, TrendSpec},
    data::{Dashboard, SeriesKind},
    format::{self, ColoredBound},
};

pub const ABOUT: [&str; 4] = [
    "Data: Statistics Dashboard (https://dashboard.e-stat.go.jp/en/), CC BY 4.0",
    "Japan GIS data: Simplemaps (https://simplemaps.com/gis/country/jp#admin1), CC BY 4.0",
    "Extreme Prefecture Dynamics: first and last prefecture in population growth rank",
    "*: 95% confidence interval for the predicted population of Japan in 2024",
];

/// A labelled number with an optional change, as shown in a metric tile.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    /// `None` when there is no previous year to compare with.
    pub delta: Option<String>,
}

impl Metric {
    fn from_delta(d: &PrefectureDelta) -> Self {
        Self {
            label: d.prefecture.clone(),
            value: format::format_count(signed(d.population)),
            delta: Some(format::format_signed_count(d.delta)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandView {
    pub lower: ColoredBound,
    pub upper: ColoredBound,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoversView {
    pub grower: Metric,
    pub shrinker: Metric,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedRow {
    pub prefecture: String,
    pub population: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub year: i32,
    pub kind: SeriesKind,
    pub theme: ColorTheme,
    pub heading: String,
    pub national: Metric,
    /// Only present for forecast years.
    pub band: Option<BandView>,
    /// `None` for the first year of the series.
    pub movers: Option<MoversView>,
    pub trend: TrendSpec,
    pub choropleth: ChoroplethSpec,
    pub ranked: Vec<RankedRow>,
    pub max_population: u64,
    pub about: &'static [&'static str],
}

impl DashboardView {
    pub fn build(dash: &Dashboard, year: i32, theme: ColorTheme) -> Self {
        let records = &dash.records;
        let kind = dash.year_kind(year);

        let heading = match kind {
            SeriesKind::Actual => format!("Population information for {year}"),
            SeriesKind::Forecast => format!("Population prediction for {year}"),
        };

        let total = aggregate::national_total(records, year).unwrap_or(0);
        let national = Metric {
            label: "Japan".to_string(),
            value: format::format_count(signed(total)),
            delta: aggregate::national_delta(records, year).map(format::format_signed_count),
        };

        let band = match kind {
            SeriesKind::Actual => None,
            SeriesKind::Forecast => aggregate::national_total(records, year - 1).map(|prior| {
                #[allow(clippy::cast_precision_loss)]
                let prior = prior as f64;
                let lower = format::colorize_bound(dash.band.lower, prior);
                let upper = format::colorize_bound(dash.band.upper, prior);
                BandView { text: format::format_band(&lower, &upper), lower, upper }
            }),
        };

        let movers = aggregate::extreme_movers(records, year).map(|m| MoversView {
            grower: Metric::from_delta(&m.grower),
            shrinker: Metric::from_delta(&m.shrinker),
        });

        let trend = charts::build_national_trend_spec(&aggregate::line_series_up_to(records, year));

        let slice = aggregate::year_slice(records, year);
        let choropleth = charts::build_choropleth_spec(&slice, &dash.shapes, theme);
        let ranked: Vec<RankedRow> = aggregate::rank_by_population(&slice)
            .into_iter()
            .map(|r| RankedRow { prefecture: r.prefecture.clone(), population: r.population })
            .collect();
        let max_population = ranked.first().map_or(0, |r| r.population);

        Self {
            year,
            kind,
            theme,
            heading,
            national,
            band,
            movers,
            trend,
            choropleth,
            ranked,
            max_population,
            about: &ABOUT,
        }
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
