mod aggregate;
mod charts;
mod config;
mod data;
mod error;
mod forecast;
mod format;
mod map_draw;
mod state;
mod ui;
mod view;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, process::ExitCode, time::Duration};

use config::Cli;
use data::Dashboard;
use error::DashboardError;
use state::AppState;
use view::DashboardView;

fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            log::error!("{err:?}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, DashboardError> {
    let dashboard = Dashboard::load(&cli.paths())?;

    if cli.check {
        return Ok(check(&dashboard));
    }

    if cli.export {
        let year = cli.year.unwrap_or(dashboard.forecast_year);
        if !dashboard.has_year(year) {
            return Err(DashboardError::UnknownYear(year));
        }
        let view = DashboardView::build(&dashboard, year, cli.theme);
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(ExitCode::SUCCESS);
    }

    let mut state = AppState::new(dashboard, cli.year, cli.theme)?;
    run_tui(&mut state)?;
    Ok(ExitCode::SUCCESS)
}

fn check(dashboard: &Dashboard) -> ExitCode {
    let report = dashboard.check_report();
    for line in report.lines() {
        println!("{line}");
    }
    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_tui(state: &mut AppState) -> Result<(), DashboardError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
) -> Result<(), DashboardError> {
    loop {
        terminal.draw(|f| ui::draw(f, state))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? {
                if state.handle_input(code) {
                    return Ok(());
                }
            }
        }
    }
}
