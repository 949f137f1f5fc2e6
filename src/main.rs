use std::sync::Arc;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing_subscriber::EnvFilter;

use muse::app::{App, AppMsg, AppOutput};
use muse::config::AppConfig;
use muse::providers::OpenRouterClient;
use muse::services::{Database, KeyValueStore, MemoryStore};
use muse::ui::input_area::{self, Action};
use muse::ui::prompt::{CommandHelper, TurnInterrupt};
use muse::ui::{chat_view, model_selector, onboarding, sidebar};

const HISTORY_FILE: &str = "history.txt";

fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let path = config.db_path();
    match Database::open(&path) {
        Ok(db) => {
            tracing::info!("Using database at {}", path.display());
            Arc::new(db)
        }
        Err(e) => {
            tracing::error!(
                "Failed to open database at {}: {:#}. Nothing will be saved this session.",
                path.display(),
                e
            );
            Arc::new(MemoryStore::new())
        }
    }
}

/// One listener for the whole process. Ctrl-C cancels the turn in flight;
/// with nothing running it ends the program.
fn listen_for_interrupts(interrupt: TurnInterrupt) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !interrupt.interrupt() {
                println!();
                std::process::exit(130);
            }
        }
    });
}

async fn dispatch(app: &mut App, interrupt: &TurnInterrupt, msg: AppMsg) -> AppOutput {
    let cancel = interrupt.begin();
    let output = app.update(msg, &cancel).await;
    interrupt.finish();
    output
}

fn report(app: &App, output: AppOutput) -> Result<()> {
    match output {
        AppOutput::Done => {}
        AppOutput::Reply(message) => {
            let number = app.engine().messages().len();
            println!("{}", chat_view::render_message(number, &message));
            if let Some(error) = app.engine().error() {
                println!("! {}", error);
            }
        }
        AppOutput::Rejected(e) => println!("! {}", e),
        AppOutput::Exported { format, payload } => {
            std::fs::write(format.file_name(), payload)
                .with_context(|| format!("Failed to write {}", format.file_name()))?;
            println!("Saved {} ({}).", format.file_name(), format.mime_type());
        }
        AppOutput::Notice(notice) => println!("{}", notice),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;
    let store = open_store(&config);
    let client = Arc::new(OpenRouterClient::new(config.api_base.clone()));
    let mut app = App::new(store, client, &config);

    if app.show_welcome() {
        println!("{}\n", onboarding::render_welcome(app.favourites()));
    }
    println!("{}", chat_view::render_status(app.engine()));

    let interrupt = TurnInterrupt::new();
    listen_for_interrupts(interrupt.clone());

    let history = config.data_dir.join(HISTORY_FILE);
    let mut rl: Editor<CommandHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(CommandHelper));
    if let Err(e) = rl.load_history(&history) {
        tracing::debug!("No input history loaded: {}", e);
    }

    loop {
        let line = match rl.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }

        let action = match input_area::parse(&line).and_then(|cmd| cmd.resolve(&app)) {
            Ok(action) => action,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match action {
            Action::Nothing => {}
            Action::Quit => break,
            Action::Help => println!("{}", input_area::HELP),
            Action::Welcome => println!("{}", onboarding::render_welcome(app.favourites())),
            Action::Show => {
                println!("{}", chat_view::render_transcript(app.engine()));
                println!("{}", chat_view::render_status(app.engine()));
                println!(
                    "Theme: {} | Mode: {}",
                    app.settings().theme().as_str(),
                    app.settings().mode().as_str()
                );
            }
            Action::Models => println!("{}", model_selector::render_models(app.engine(), app.presets())),
            Action::Genres => println!("{}", model_selector::render_genres(app.engine())),
            Action::Favourites => println!("{}", sidebar::render_favourites(app.favourites())),
            Action::Sessions => println!("{}", sidebar::render_sessions(app.archive())),
            Action::Presets => println!("{}", model_selector::render_presets(app.presets())),
            Action::Dispatch(msg) => {
                let shows_conversation = matches!(
                    msg,
                    AppMsg::RestoreSession(_) | AppMsg::ClearConversation | AppMsg::Start
                );
                let shows_status = matches!(
                    msg,
                    AppMsg::SelectModel(_) | AppMsg::SelectGenre(_) | AppMsg::SelectFavourite(_)
                );

                let output = dispatch(&mut app, &interrupt, msg).await;
                if let Err(e) = report(&app, output) {
                    tracing::error!("{:#}", e);
                    println!("! {:#}", e);
                }

                if shows_conversation {
                    println!("{}", chat_view::render_transcript(app.engine()));
                }
                if shows_conversation || shows_status {
                    println!("{}", chat_view::render_status(app.engine()));
                }
            }
        }
    }

    if let Err(e) = rl.save_history(&history) {
        tracing::warn!("Failed to save input history: {}", e);
    }
    Ok(())
}
