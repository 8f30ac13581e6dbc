use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the dashboard from starting.
///
/// Every load variant carries the path of the file that failed so the
/// message printed by `main` points at the broken resource.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A data file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV file has a missing column or an unparseable value.
    #[error("failed to parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The boundary file is not valid `GeoJSON`.
    #[error("failed to parse GeoJSON {}: {source}", path.display())]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    /// The boundary file parsed but its shapes could not be used.
    #[error("invalid geometry in {}: {message}", path.display())]
    Geometry { path: PathBuf, message: String },

    /// A data file has a header but no rows.
    #[error("no records in {}", path.display())]
    EmptyDataset { path: PathBuf },

    /// The requested year has no records.
    #[error("year {0} is not present in the dataset")]
    UnknownYear(i32),

    /// Terminal setup or drawing failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// The dashboard view could not be serialized.
    #[error("failed to serialize dashboard view: {0}")]
    Json(#[from] serde_json::Error),
}
