use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use colored::Colorize;
use crossterm::{event, terminal};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use aivi_application::{EditCommand, EditorSession, SessionSnapshot};
use aivi_core::buffer::BufferId;
use aivi_infrastructure::{AiviPaths, load_user_config};
use aivi_interaction::{ChatCompletion, OpenAIChatClient, ScriptedCompletion};

mod commands;

use commands::{COMMANDS, Input, parse_input};

/// Lines shown above and below the cursor.
const VIEW_RADIUS: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "aivi", version, about = "Text editor with viewpoint-driven AI rewrites")]
struct Cli {
    /// Session file (defaults to `default_session` from config.toml)
    file: Option<PathBuf>,
}

/// Completion and hints for `:` commands.
#[derive(Clone)]
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with(':') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|(name, _)| name.starts_with(line))
            .map(|(name, _)| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with(':') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with(':') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|(name, _)| name.starts_with(line) && name.len() > line.len())
                .map(|(name, _)| name[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Sends logs to `~/.config/aivi/logs/aivi.log.YYYY-MM-DD` so the terminal
/// stays clean. `RUST_LOG` overrides the default `info` filter.
fn init_logging() -> Option<WorkerGuard> {
    let log_dir = AiviPaths::logs_dir().ok()?;
    std::fs::create_dir_all(&log_dir).ok()?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "aivi.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

fn completion_client(api: &aivi_core::config::ApiConfig) -> Arc<dyn ChatCompletion> {
    match OpenAIChatClient::try_from_env(api) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!("[Bootstrap] No completion client: {}", e);
            println!(
                "{}",
                format!("{e}. Exchanges will fail until a key is configured.").yellow()
            );
            Arc::new(ScriptedCompletion::default())
        }
    }
}

/// Throws away whatever was typed while an exchange was in flight.
///
/// Raw mode releases a half-typed line from the terminal's line buffer so
/// it is discarded too.
fn drain_typeahead() {
    if !std::io::stdin().is_terminal() {
        return;
    }
    let raw = terminal::enable_raw_mode().is_ok();
    let mut dropped = 0usize;
    while matches!(event::poll(Duration::ZERO), Ok(true)) {
        if event::read().is_err() {
            break;
        }
        dropped += 1;
    }
    if raw {
        let _ = terminal::disable_raw_mode();
    }
    if dropped > 0 {
        debug!("[Bootstrap] Discarded {} input events typed during the exchange", dropped);
    }
}

fn is_marker(line: &str, comment_prefix: &str) -> bool {
    let opener = format!("{comment_prefix}>>>");
    let closer = format!("{comment_prefix}<<<");
    let line = line.trim_start();
    line.starts_with(&opener) || line.starts_with(&closer)
}

fn render(snapshot: &SessionSnapshot, comment_prefix: &str) {
    let header = format!(
        "<{}> {} r{}.{} [{}]",
        snapshot.label(),
        snapshot.viewpoint,
        snapshot.rev,
        snapshot.subrevision,
        match snapshot.active {
            BufferId::Edit => "edit",
            BufferId::Command => "command",
        }
    );
    println!("{}", header.bright_magenta().bold());

    let view = snapshot.active_view();
    let cursor = view.cursor.line;
    let start = cursor.saturating_sub(VIEW_RADIUS);
    let end = (cursor + VIEW_RADIUS + 1).min(view.lines.len());
    for (index, line) in view.lines.iter().enumerate().take(end).skip(start) {
        let marked = if snapshot.marked.contains(&index) { "*" } else { " " };
        let gutter = format!("{index:03}{marked}");
        if index == cursor {
            println!("{} {}", gutter.reversed(), line.bold());
        } else if is_marker(line, comment_prefix) {
            println!("{} {}", gutter.bright_black(), line.bright_blue());
        } else {
            println!("{} {}", gutter.bright_black(), line);
        }
    }
}

fn print_help() {
    for (name, help) in COMMANDS {
        println!("  {:<8} {}", name.bright_cyan(), help.bright_black());
    }
    println!("  {}", "any other line is typed into the active buffer".bright_black());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging();

    let config = load_user_config().context("Failed to load ~/.config/aivi/config.toml")?;
    let path = cli
        .file
        .unwrap_or_else(|| PathBuf::from(&config.default_session));
    info!("[Bootstrap] Starting aivi on {:?}", path);

    let client = completion_client(&config.api);
    let mut session = EditorSession::open(&config, &path, client)?;

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== aivi ===".bright_magenta().bold());
    println!("{}", "Type ':help' for commands, ':q' to quit.".bright_black());
    let comment_prefix = config.comment_prefix.clone();
    render(&session.snapshot(), &comment_prefix);

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(&line);
                }
                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Help => print_help(),
                    Input::Unknown(text) => {
                        println!("{}", format!("Unknown command: {text}").red());
                    }
                    Input::Commands(commands) => {
                        let exchanged = commands.contains(&EditCommand::TriggerExchange);
                        let mut last = None;
                        for command in commands {
                            last = Some(session.apply(command).await);
                        }
                        if exchanged {
                            drain_typeahead();
                        }
                        if let Some(snapshot) = last {
                            render(&snapshot, &comment_prefix);
                        }
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type ':q' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    info!("[Bootstrap] Exiting");
    Ok(())
}
