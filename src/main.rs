use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::{info, warn};

use diary_reader::app::{Action, App, Command};
use diary_reader::config::Config;
use diary_reader::fetch::Fetcher;
use diary_reader::source::{EntryStore, SupabaseStore};
use diary_reader::{input, logging, ui};

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen and turns on
/// mouse capture.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(info);
    }));
}

fn run_command(command: Command, fetcher: &Fetcher<SupabaseStore>) {
    match command {
        Command::Fetch { generation } => fetcher.spawn(generation),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let config = Config::parse();
    let _log_guard = logging::init(&config.log_dir(), config.verbose);
    install_panic_hook();

    // -- store handle (absent when unconfigured) -----------------------------
    let store = config.store_handle();
    match &store {
        Some(store) => info!(store = store.name(), "store configured"),
        None => warn!("SUPABASE_URL or SUPABASE_ANON_KEY missing; store not configured"),
    }

    // -- background fetching -------------------------------------------------
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let (fetcher, rx) = Fetcher::new(store, config.fetch_plan(), runtime.handle().clone());

    let mut app = App::new();
    if let Some(command) = app.update(Action::Load) {
        run_command(command, &fetcher);
    }

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    let mut guard = TerminalGuard::new().context("failed to initialise terminal")?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply any finished fetches.
    //   2. Render the UI.
    //   3. Poll for keyboard or mouse input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = rx.try_recv() {
            if let Some(command) = app.update(Action::Fetched(msg)) {
                run_command(command, &fetcher);
            }
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            let action = match event::read()? {
                Event::Key(key) => input::handle_key_event(&app, key),
                Event::Mouse(mouse) => {
                    let size = guard.terminal.size()?;
                    input::handle_mouse_event(&app, mouse, Rect::new(0, 0, size.width, size.height))
                }
                _ => None,
            };
            if let Some(command) = action.and_then(|action| app.update(action)) {
                run_command(command, &fetcher);
            }
        }

        if app.quit {
            break;
        }
    }

    info!("exiting");
    // In-flight fetches are abandoned rather than awaited.
    runtime.shutdown_background();
    Ok(())
}
