use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    str::FromStr,
};
use geojson::GeoJson;

use crate::{
    error::DashboardError,
    forecast::{self, ConfidenceBand, PrefectureMapping},
    map_draw::MapView,
};

/// Whether a year's figures were measured or predicted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Actual,
    Forecast,
}

/// Geographic metadata joined onto a prefecture's records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrefectureMeta {
    pub region: String,
    pub region_code: String,
    pub prefecture_code: String,
}

/// One prefecture in one year. `meta` is `None` only for forecast rows
/// whose prefecture name has no match in the historical data.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopulationRecord {
    pub prefecture: String,
    pub meta: Option<PrefectureMeta>,
    pub year: i32,
    pub population: u64,
    pub kind: SeriesKind,
}

impl PopulationRecord {
    pub fn region(&self) -> Option<&str> {
        self.meta.as_ref().map(|m| m.region.as_str())
    }

    pub fn prefecture_code(&self) -> Option<&str> {
        self.meta.as_ref().map(|m| m.prefecture_code.as_str())
    }
}

/// Row of the historical CSV.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HistoricalRow {
    pub region: String,
    pub region_code: String,
    pub prefecture: String,
    pub prefecture_code: String,
    pub year: i32,
    pub population: u64,
}

impl From<HistoricalRow> for PopulationRecord {
    fn from(row: HistoricalRow) -> Self {
        Self {
            prefecture: row.prefecture,
            meta: Some(PrefectureMeta {
                region: row.region,
                region_code: row.region_code,
                prefecture_code: row.prefecture_code,
            }),
            year: row.year,
            population: row.population,
            kind: SeriesKind::Actual,
        }
    }
}

/// Row of the forecast CSV.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ForecastRecord {
    pub prefecture: String,
    pub predicted_population_2024: f64,
    pub confidence_interval_lower: f64,
    pub confidence_interval_upper: f64,
}

/// Locations of the three input files.
#[derive(Clone, Debug)]
pub struct DataPaths {
    pub historical: PathBuf,
    pub forecast: PathBuf,
    pub geo: PathBuf,
}

impl DataPaths {
    pub fn in_dir<P: AsRef<Path>>(base: P, historical: &str, forecast: &str, geo: &str) -> Self {
        let base = base.as_ref();
        Self {
            historical: base.join(historical),
            forecast: base.join(forecast),
            geo: base.join(geo),
        }
    }
}

/// Everything the pipeline reads, built once at startup and only borrowed
/// afterwards.
pub struct Dashboard {
    /// Historical rows in file order, then forecast rows in file order.
    pub records: Vec<PopulationRecord>,
    pub mapping: PrefectureMapping,
    pub band: ConfidenceBand,
    /// Forecast prefectures that did not join onto the historical mapping.
    pub unmatched_forecasts: Vec<String>,
    pub last_actual_year: i32,
    pub forecast_year: i32,
    pub shapes: MapView,
}

impl Dashboard {
    pub fn load(paths: &DataPaths) -> Result<Self, DashboardError> {
        let historical: Vec<HistoricalRow> = read_csv(&paths.historical)?;
        let forecasts: Vec<ForecastRecord> = read_csv(&paths.forecast)?;
        let shapes = load_boundaries(&paths.geo)?;
        log::info!(
            "Loaded {} historical rows, {} forecast rows, {} prefecture shapes",
            historical.len(),
            forecasts.len(),
            shapes.feature_count()
        );
        Ok(Self::from_parts(historical, &forecasts, shapes))
    }

    /// Builds the context from rows that are already in memory.
    pub fn from_parts(
        historical: Vec<HistoricalRow>,
        forecasts: &[ForecastRecord],
        shapes: MapView,
    ) -> Self {
        let merged = forecast::integrate(historical, forecasts);
        Self {
            records: merged.records,
            mapping: merged.mapping,
            band: merged.band,
            unmatched_forecasts: merged.unmatched,
            last_actual_year: merged.last_actual_year,
            forecast_year: forecast::FORECAST_YEAR,
            shapes,
        }
    }

    /// Kind of the data shown for `year`.
    pub fn year_kind(&self, year: i32) -> SeriesKind {
        if self
            .records
            .iter()
            .any(|r| r.year == year && r.kind == SeriesKind::Actual)
        {
            SeriesKind::Actual
        } else {
            SeriesKind::Forecast
        }
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.records.iter().any(|r| r.year == year)
    }

    /// Summary of the join between the forecast and the historical data.
    pub fn check_report(&self) -> CheckReport {
        let first_year = self.records.iter().map(|r| r.year).min().unwrap_or_default();
        CheckReport {
            summary: format!(
                "{} records, {} prefectures, actual years {}..={}, forecast {}",
                self.records.len(),
                self.mapping.len(),
                first_year,
                self.last_actual_year,
                self.forecast_year
            ),
            unmatched: self.unmatched_forecasts.clone(),
        }
    }
}

/// Output of `--check`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckReport {
    pub summary: String,
    pub unmatched: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.summary.clone()];
        if self.is_clean() {
            lines.push("All forecast prefectures match the historical data".to_string());
        } else {
            lines.extend(
                self.unmatched
                    .iter()
                    .map(|name| format!("unmatched forecast prefecture: {name}")),
            );
        }
        lines
    }
}

/// Reads a whole CSV file into typed rows, failing on an empty file.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DashboardError> {
    let file = File::open(path).map_err(|source| DashboardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| DashboardError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    if rows.is_empty() {
        return Err(DashboardError::EmptyDataset { path: path.to_path_buf() });
    }
    log::debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn load_boundaries(path: &Path) -> Result<MapView, DashboardError> {
    let txt = fs::read_to_string(path).map_err(|source| DashboardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = GeoJson::from_str(&txt).map_err(|source| DashboardError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    MapView::new(raw).map_err(|err| DashboardError::Geometry {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn row(prefecture: &str, code: &str, year: i32, population: u64) -> HistoricalRow {
        HistoricalRow {
            region: "Kanto".to_string(),
            region_code: "3".to_string(),
            prefecture: prefecture.to_string(),
            prefecture_code: code.to_string(),
            year,
            population,
        }
    }

    pub fn forecast(prefecture: &str, predicted: f64, lower: f64, upper: f64) -> ForecastRecord {
        ForecastRecord {
            prefecture: prefecture.to_string(),
            predicted_population_2024: predicted,
            confidence_interval_lower: lower,
            confidence_interval_upper: upper,
        }
    }

    pub fn dashboard(historical: Vec<HistoricalRow>, forecasts: &[ForecastRecord]) -> Dashboard {
        Dashboard::from_parts(historical, forecasts, MapView::default())
    }
}
