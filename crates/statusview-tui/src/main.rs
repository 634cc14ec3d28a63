use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use statusview_tui::app::{App, Mode};
use statusview_tui::config::ViewerConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = ViewerConfig::parse();
    init_logging(config.log_file.as_deref())?;

    let app = App::from_config(&config)?;
    info!("statusview starting with {} projects", app.state().data.len());

    run_tui(app, config.opener.as_deref())
}

/// Logs go to a file because the terminal is owned by the UI.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui(app: App, opener: Option<&str>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app, opener);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    opener: Option<&str>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        // Handle link requests before reading events
        if let Some(url) = app.open_request.take() {
            match opener {
                Some(cmd) => {
                    let result = open_url(cmd, &url);
                    app.open_done(&url, result);
                }
                None => app.show_link(&url),
            }
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless the dialog is up
            if key.code == KeyCode::Char('q') && app.mode() == Mode::Normal {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}

fn open_url(opener: &str, url: &str) -> Result<()> {
    let status = Command::new(opener)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("failed to run {opener}"))?;
    if !status.success() {
        bail!("{opener} exited with {status}");
    }
    Ok(())
}
