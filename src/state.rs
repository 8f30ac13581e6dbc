use crossterm::event::KeyCode;
use strum::IntoEnumIterator;

use crate::{
    aggregate,
    charts::ColorTheme,
    data::Dashboard,
    error::DashboardError,
    view::DashboardView,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Years,
    Themes,
}

pub struct AppState {
    pub dashboard: Dashboard,
    /// Most recent first.
    pub years: Vec<i32>,
    pub themes: Vec<ColorTheme>,
    pub selected_year: usize,
    pub selected_theme: usize,
    pub active_panel: Panel,
    pub view: DashboardView,
}

impl AppState {
    pub const HELP_TEXT: &'static str = "↑/↓: select  Tab: year/theme  q: quit";

    pub fn new(
        dashboard: Dashboard,
        year: Option<i32>,
        theme: ColorTheme,
    ) -> Result<Self, DashboardError> {
        let years = aggregate::available_years(&dashboard.records);
        let selected_year = match year {
            Some(y) => years.iter().position(|&v| v == y).ok_or(DashboardError::UnknownYear(y))?,
            None if years.is_empty() => return Err(DashboardError::UnknownYear(dashboard.forecast_year)),
            None => 0,
        };
        let themes: Vec<ColorTheme> = ColorTheme::iter().collect();
        let selected_theme = themes.iter().position(|&t| t == theme).unwrap_or(0);
        let view = DashboardView::build(&dashboard, years[selected_year], themes[selected_theme]);

        Ok(Self {
            dashboard,
            years,
            themes,
            selected_year,
            selected_theme,
            active_panel: Panel::Years,
            view,
        })
    }

    pub fn year(&self) -> i32 {
        self.years[self.selected_year]
    }

    pub fn theme(&self) -> ColorTheme {
        self.themes[self.selected_theme]
    }

    fn refresh(&mut self) {
        log::debug!("Rebuilding view for {} / {}", self.year(), self.theme());
        self.view = DashboardView::build(&self.dashboard, self.year(), self.theme());
    }

    /// Returns true when the user asked to quit.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        use KeyCode::*;
        let before = (self.selected_year, self.selected_theme);
        match key {
            Char('q') | Esc => return true,
            Tab | BackTab => {
                self.active_panel = match self.active_panel {
                    Panel::Years => Panel::Themes,
                    Panel::Themes => Panel::Years,
                };
            }
            Up => match self.active_panel {
                Panel::Years => self.selected_year = self.selected_year.saturating_sub(1),
                Panel::Themes => self.selected_theme = self.selected_theme.saturating_sub(1),
            },
            Down => match self.active_panel {
                Panel::Years => {
                    if self.selected_year + 1 < self.years.len() {
                        self.selected_year += 1;
                    }
                }
                Panel::Themes => {
                    if self.selected_theme + 1 < self.themes.len() {
                        self.selected_theme += 1;
                    }
                }
            },
            _ => {}
        }
        if before != (self.selected_year, self.selected_theme) {
            self.refresh();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{dashboard, forecast, row};

    fn state(year: Option<i32>) -> Result<AppState, DashboardError> {
        let dash = dashboard(
            vec![row("Tokyo", "JP13", 2022, 100), row("Tokyo", "JP13", 2023, 110)],
            &[forecast("Tokyo", 120.0, 110.0, 130.0)],
        );
        AppState::new(dash, year, ColorTheme::Greens)
    }

    #[test]
    fn starts_on_most_recent_year() {
        let app = state(None).unwrap();
        assert_eq!(app.years, vec![2024, 2023, 2022]);
        assert_eq!(app.year(), 2024);
        assert_eq!(app.theme(), ColorTheme::Greens);
        assert_eq!(app.view.year, 2024);
    }

    #[test]
    fn unknown_start_year_is_rejected() {
        assert!(matches!(state(Some(1900)), Err(DashboardError::UnknownYear(1900))));
        assert_eq!(state(Some(2022)).unwrap().year(), 2022);
    }

    #[test]
    fn keys_move_the_focused_list() {
        let mut app = state(None).unwrap();
        assert!(!app.handle_input(KeyCode::Down));
        assert_eq!(app.view.year, 2023);
        app.handle_input(KeyCode::Down);
        app.handle_input(KeyCode::Down);
        assert_eq!(app.year(), 2022);

        app.handle_input(KeyCode::Tab);
        assert_eq!(app.active_panel, Panel::Themes);
        app.handle_input(KeyCode::Down);
        assert_eq!(app.view.theme, ColorTheme::Reds);
        app.handle_input(KeyCode::Up);
        app.handle_input(KeyCode::Up);
        app.handle_input(KeyCode::Up);
        assert_eq!(app.theme(), ColorTheme::Blues);
        assert_eq!(app.year(), 2022);
    }

    #[test]
    fn q_quits() {
        let mut app = state(None).unwrap();
        assert!(app.handle_input(KeyCode::Char('q')));
    }
}
