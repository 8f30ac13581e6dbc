use std::path::PathBuf;

use clap::Parser;

use crate::{charts::ColorTheme, data::DataPaths};

#[derive(Parser, Debug)]
#[command(
    name = "japan_population_dashboard",
    about = "Terminal dashboard of Japan's population by prefecture, 1975-2024"
)]
pub struct Cli {
    /// Directory the data files are resolved against
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Historical population CSV
    #[arg(long, default_value = "japan_population_1975_2023.csv")]
    pub historical: String,

    /// Forecast CSV with confidence intervals
    #[arg(long, default_value = "forecast/population_forecasts_2024.csv")]
    pub forecast: String,

    /// Prefecture boundaries (`GeoJSON`, feature property `id` = prefecture code)
    #[arg(long, default_value = "jp_geo.json")]
    pub geo: String,

    /// Initially selected year (defaults to the most recent one)
    #[arg(long)]
    pub year: Option<i32>,

    /// Initially selected color theme
    #[arg(long, default_value_t = ColorTheme::Blues)]
    pub theme: ColorTheme,

    /// Print the dashboard view for the selection as JSON and exit
    #[arg(long)]
    pub export: bool,

    /// List forecast prefectures missing from the historical data and exit
    #[arg(long, conflicts_with = "export")]
    pub check: bool,
}

impl Cli {
    pub fn paths(&self) -> DataPaths {
        DataPaths::in_dir(&self.data_dir, &self.historical, &self.forecast, &self.geo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_data_dir() {
        let cli = Cli::try_parse_from(["dash"]).unwrap();
        let paths = cli.paths();
        assert_eq!(paths.historical, PathBuf::from("data/japan_population_1975_2023.csv"));
        assert_eq!(paths.forecast, PathBuf::from("data/forecast/population_forecasts_2024.csv"));
        assert_eq!(paths.geo, PathBuf::from("data/jp_geo.json"));
        assert_eq!(cli.theme, ColorTheme::Blues);
        assert_eq!(cli.year, None);
        assert!(!cli.export && !cli.check);
    }

    #[test]
    fn selection_flags() {
        let cli = Cli::try_parse_from([
            "dash", "--data-dir", "/srv/jp", "--year", "1990", "--theme", "portland", "--export",
        ])
        .unwrap();
        assert_eq!(cli.paths().geo, PathBuf::from("/srv/jp/jp_geo.json"));
        assert_eq!(cli.year, Some(1990));
        assert_eq!(cli.theme, ColorTheme::Portland);
        assert!(cli.export);
    }

    #[test]
    fn rejects_unknown_theme() {
        assert!(Cli::try_parse_from(["dash", "--theme", "viridis"]).is_err());
    }

    #[test]
    fn export_and_check_conflict() {
        assert!(Cli::try_parse_from(["dash", "--export", "--check"]).is_err());
    }
}
