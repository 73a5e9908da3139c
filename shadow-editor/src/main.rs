#![warn(clippy::pedantic)]

pub mod global;

use std::path::{Path, PathBuf};

use anyhow::Result as AnyResult;
use shadow_editor_core::{
    commands::CommandRegistry,
    history::{CommandId, HistorySettings},
    io, Editor,
};

use global::{notify::BusNotifier, settings::Settings};

const USAGE: &str = "usage: shadow-editor <document.json> [--apply <commands.json>] [--undo <n>] [--redo <n>] \
                     [--goto <id|start>] [--clear] [--with-history] [--save] [--output <path>]";

/// Performed in the order given on the command line.
enum Action {
    Apply(PathBuf),
    Undo(usize),
    Redo(usize),
    GoTo(Option<CommandId>),
    Clear,
}

struct Args {
    document: PathBuf,
    actions: Vec<Action>,
    with_history: bool,
    save: bool,
    output: Option<PathBuf>,
}

fn value(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> AnyResult<std::ffi::OsString> {
    args.next()
        .ok_or_else(|| anyhow::anyhow!("{flag} expects a value\n{USAGE}"))
}
fn count(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> AnyResult<usize> {
    let value = value(args, flag)?;
    value
        .to_str()
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("{flag} expects a count, got {}", value.to_string_lossy()))
}

fn parse_args(mut args: impl Iterator<Item = std::ffi::OsString>) -> AnyResult<Args> {
    let document = args.next().ok_or_else(|| anyhow::anyhow!(USAGE))?.into();
    let mut parsed = Args {
        document,
        actions: Vec::new(),
        with_history: false,
        save: false,
        output: None,
    };
    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--apply") => parsed
                .actions
                .push(Action::Apply(value(&mut args, "--apply")?.into())),
            Some("--undo") => parsed.actions.push(Action::Undo(count(&mut args, "--undo")?)),
            Some("--redo") => parsed.actions.push(Action::Redo(count(&mut args, "--redo")?)),
            Some("--goto") => {
                let target = value(&mut args, "--goto")?;
                let target = match target.to_str() {
                    Some("start") => None,
                    Some(id) => Some(
                        id.parse()
                            .ok()
                            .and_then(CommandId::new)
                            .ok_or_else(|| anyhow::anyhow!("{id} is not a history id"))?,
                    ),
                    None => anyhow::bail!("{} is not a history id", target.to_string_lossy()),
                };
                parsed.actions.push(Action::GoTo(target));
            }
            Some("--clear") => parsed.actions.push(Action::Clear),
            Some("--with-history") => parsed.with_history = true,
            Some("--save") => parsed.save = true,
            Some("--output") => parsed.output = Some(value(&mut args, "--output")?.into()),
            _ => anyhow::bail!("unexpected argument {}\n{USAGE}", arg.to_string_lossy()),
        }
    }
    Ok(parsed)
}

/// Execute every command in a file holding one command or an array of them.
fn apply_file(editor: &mut Editor<BusNotifier>, path: &Path) -> AnyResult<()> {
    let string = std::fs::read_to_string(path)?;
    let commands = match serde_json::from_str::<serde_json::Value>(&string)? {
        serde_json::Value::Array(commands) => commands,
        single => vec![single],
    };
    for json in &commands {
        let header = CommandRegistry::header(json)?;
        let command = editor.command_from_json(json)?;
        if header.name.is_empty() {
            editor.execute(command)?;
        } else {
            editor.execute_named(command, header.name)?;
        }
    }
    log::info!("applied {} commands from {}", commands.len(), path.display());
    Ok(())
}

fn perform(editor: &mut Editor<BusNotifier>, action: &Action) -> AnyResult<()> {
    match action {
        Action::Apply(path) => apply_file(editor, path)?,
        Action::Undo(n) => {
            for _ in 0..*n {
                if editor.undo()?.is_none() {
                    break;
                }
            }
        }
        Action::Redo(n) => {
            for _ in 0..*n {
                if editor.redo()?.is_none() {
                    break;
                }
            }
        }
        Action::GoTo(target) => editor.go_to_state(*target)?,
        Action::Clear => editor.clear_history(),
    }
    Ok(())
}

fn print_history(editor: &Editor<BusNotifier>) {
    let history = editor.history();
    println!("{} objects, {} undo, {} redo", editor.scene().object_count(), history.undo_count(), history.redo_count());
    for (id, name) in history.iter_undos() {
        let marker = if Some(id) == history.current_id() { '>' } else { ' ' };
        println!("{marker} {id:>4}  {name}");
    }
    for (id, name) in history.iter_redos() {
        println!("  {id:>4}  {name} (undone)");
    }
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let args = parse_args(std::env::args_os().skip(1))?;
    let settings = Settings::get();
    if settings.did_fail_to_load() {
        if let Err(e) = settings.save() {
            log::warn!("Failed to write default settings: {e}");
        }
    }
    let history_settings = HistorySettings {
        persistent: settings.history.persistent || args.with_history,
        ..settings.history.clone()
    };

    let mut notifier = BusNotifier::default();
    let mut signals = notifier.subscribe();
    let (mut editor, skipped) = io::read_path(&args.document, history_settings, notifier)?;
    for error in &skipped {
        log::warn!("{error}");
    }

    for action in &args.actions {
        let result = perform(&mut editor, action);
        while let Ok(signal) = signals.try_recv() {
            log::debug!("{signal:?}");
        }
        result?;
    }
    print_history(&editor);

    if args.save || args.output.is_some() {
        let output = args.output.as_deref().unwrap_or(&args.document);
        io::write_path(output, &editor)?;
    }
    Ok(())
}
