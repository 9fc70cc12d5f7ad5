//! Personas TUI - terminal admin console for personas físicas.
//!
//! Main entry point and event loop for the application.

mod api;
mod app;
mod cli;
mod config;
mod form;
mod logging;
mod router;
mod rows;
mod tasks;
mod ui;

use api::{PersonaFisica, PersonasBackend, PersonasClient, PersonasStore};
use app::{Action, App, Completion};
use clap::Parser;
use cli::Args;
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use ui::Hitboxes;

/// Main application entry point.
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// Loads configuration, sets up logging and the API client, then runs the
/// event loop until the user quits.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    if args.init_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => Config::default_config_path()?,
        };
        config.save(&path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    logging::init(&config)?;

    let client = PersonasClient::new(&config)?;
    tracing::info!(base_url = %client.endpoint(None), "starting personas console");
    let store = Arc::new(PersonasStore::new(client));

    let mut app = App::new(config.date_formats(), config.page_size);

    // Restore the terminal before the default hook prints the panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        default_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let result = run_app(&mut terminal, &mut app, &store).await;

    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    result
}

fn restore_terminal() -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Main event loop.
///
/// # Arguments
/// * `terminal` - Terminal instance
/// * `app` - Application state
/// * `store` - Shared personas store
///
/// # Returns
/// * `Result<()>` - Success or error
///
/// # Details
/// Each iteration renders, then applies store snapshots and completions,
/// then handles at most one terminal event. Terminal polling uses a short
/// timeout to keep the UI responsive to background results.
async fn run_app<B: PersonasBackend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &Arc<PersonasStore<B>>,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut personas = store.subscribe();
    let mut hitboxes = Hitboxes::default();

    if let Some(action) = app.mount() {
        tasks::spawn_action(store, action, &tx);
    }

    loop {
        sync_snapshot(&mut personas, app);
        while let Ok(completion) = rx.try_recv() {
            app.complete(completion);
        }
        // Completions may have changed the collection
        sync_snapshot(&mut personas, app);

        terminal.draw(|f| {
            hitboxes = ui::render(f, app);
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        let action = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                app.handle_key(key, chrono::Local::now().date_naive())
            }
            Event::Mouse(mouse) => handle_mouse_event(mouse, app, &hitboxes),
            _ => None,
        };

        match action {
            Some(Action::Quit) => break,
            Some(action) => {
                tracing::debug!(?action, "dispatching");
                tasks::spawn_action(store, action, &tx);
            }
            None => {}
        }
    }

    Ok(())
}

/// Pull the latest store snapshot into the app if it changed.
fn sync_snapshot(personas: &mut watch::Receiver<Vec<PersonaFisica>>, app: &mut App) {
    if personas.has_changed().unwrap_or(false) {
        let snapshot = personas.borrow_and_update().clone();
        app.set_personas(snapshot);
    }
}

/// Handle mouse events (scroll and click).
///
/// # Details
/// Wheel moves the cursor on the list; left click is resolved against the
/// regions of the last rendered frame.
fn handle_mouse_event(mouse: MouseEvent, app: &mut App, hitboxes: &Hitboxes) -> Option<Action> {
    let on_list = app.edit.is_none() && app.create_modal.is_none() && !app.delete_flow.is_open();
    match mouse.kind {
        MouseEventKind::ScrollUp if on_list => {
            app.move_up();
            None
        }
        MouseEventKind::ScrollDown if on_list => {
            app.move_down();
            None
        }
        MouseEventKind::Down(MouseButton::Left) => hitboxes
            .target_at(mouse.column, mouse.row)
            .and_then(|target| app.click(target)),
        _ => None,
    }
}
