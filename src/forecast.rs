//! Merges the one-year forecast into the historical series.
//!
//! Every prefecture forecast comes with a 95% interval. Treating the
//! prefectures as independent, their variances add up, which gives a
//! single band for the national total.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::{ForecastRecord, HistoricalRow, PopulationRecord, PrefectureMeta, SeriesKind};

/// Year the forecast file predicts.
pub const FORECAST_YEAR: i32 = 2024;

/// Standard normal quantile for a two-sided 95% interval.
const Z_95: f64 = 1.96;

/// Width of a 95% interval measured in standard deviations.
const INTERVAL_WIDTH_IN_SD: f64 = 2.0 * Z_95;

/// National confidence band for the forecast year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ConfidenceBand {
    pub predicted_total: f64,
    pub pooled_std: f64,
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceBand {
    pub fn pooled(forecasts: &[ForecastRecord]) -> Self {
        let predicted_total: f64 = forecasts.iter().map(|f| f.predicted_population_2024).sum();
        let variance: f64 = forecasts
            .iter()
            .map(|f| {
                let sd = (f.confidence_interval_upper - f.confidence_interval_lower)
                    / INTERVAL_WIDTH_IN_SD;
                sd * sd
            })
            .sum();
        let pooled_std = variance.sqrt();
        Self {
            predicted_total,
            pooled_std,
            lower: predicted_total - Z_95 * pooled_std,
            upper: predicted_total + Z_95 * pooled_std,
        }
    }
}

/// Prefecture name → geographic metadata, taken from the historical rows.
/// The first row seen for a name wins.
#[derive(Clone, Debug, Default)]
pub struct PrefectureMapping {
    by_name: HashMap<String, PrefectureMeta>,
}

impl PrefectureMapping {
    pub fn from_rows(rows: &[HistoricalRow]) -> Self {
        let mut by_name = HashMap::new();
        for row in rows {
            by_name
                .entry(row.prefecture.clone())
                .or_insert_with(|| PrefectureMeta {
                    region: row.region.clone(),
                    region_code: row.region_code.clone(),
                    prefecture_code: row.prefecture_code.clone(),
                });
        }
        Self { by_name }
    }

    pub fn get(&self, prefecture: &str) -> Option<&PrefectureMeta> {
        self.by_name.get(prefecture)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}

/// Output of [`integrate`].
pub struct Merged {
    pub records: Vec<PopulationRecord>,
    pub mapping: PrefectureMapping,
    pub band: ConfidenceBand,
    pub unmatched: Vec<String>,
    pub last_actual_year: i32,
}

/// Appends the forecast rows to the historical rows.
///
/// Forecast rows are left-joined onto the mapping by exact prefecture
/// name. A row that does not match is kept with `meta: None` and its name
/// is reported in [`Merged::unmatched`].
pub fn integrate(historical: Vec<HistoricalRow>, forecasts: &[ForecastRecord]) -> Merged {
    let mapping = PrefectureMapping::from_rows(&historical);
    let band = ConfidenceBand::pooled(forecasts);
    let last_actual_year = historical
        .iter()
        .map(|r| r.year)
        .max()
        .unwrap_or(FORECAST_YEAR - 1);

    let mut records: Vec<PopulationRecord> = Vec::with_capacity(historical.len() + forecasts.len());
    records.extend(historical.into_iter().map(PopulationRecord::from));

    let mut unmatched = Vec::new();
    for f in forecasts {
        let meta = mapping.get(&f.prefecture).cloned();
        if meta.is_none() {
            log::warn!(
                "Forecast prefecture {:?} has no match in the historical data",
                f.prefecture
            );
            unmatched.push(f.prefecture.clone());
        }
        records.push(PopulationRecord {
            prefecture: f.prefecture.clone(),
            meta,
            year: FORECAST_YEAR,
            population: predicted_count(f.predicted_population_2024),
            kind: SeriesKind::Forecast,
        });
    }

    log::debug!(
        "National forecast {:.0} (pooled sd {:.1}, band {:.0}..{:.0})",
        band.predicted_total,
        band.pooled_std,
        band.lower,
        band.upper
    );

    Merged { records, mapping, band, unmatched, last_actual_year }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn predicted_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
