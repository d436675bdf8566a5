// CLI binary: panicking on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use devconsole::demo::DemoScene;
use devconsole::registry::catalog::{command_list, help_text};
use devconsole::{config, paths, Console, ConsoleSetup, ConsoleView, MacroReplay, SubmitOutcome};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "devconsole-cli", about = "Headless command console over a demo scene", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the config, history and macro files
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read command lines from stdin. Lines starting with '?' show hints,
    /// '!' replays a macro
    Repl,
    /// Execute each argument as one command line
    Run {
        #[arg(required = true)]
        lines: Vec<String>,
    },
    /// Show the parse state and hints for a partial line
    Hints {
        text: String,
        /// Move the selection this many steps and insert the hint
        #[arg(long)]
        select: Option<i32>,
    },
    /// List stored history
    History,
    /// List registered commands
    Commands {
        /// Filter words or a command name
        topic: Option<String>,
    },
    /// Replay a stored macro
    Macro { trigger: String },
    /// Write the default config file into the data directory
    InitConfig,
}

// ── Setup ───────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn data_dir(arg: Option<&str>) -> PathBuf {
    arg.map_or_else(|| PathBuf::from("."), PathBuf::from)
}

fn build_console(scene: &DemoScene, dir: &Path) -> Console {
    let setup = ConsoleSetup::in_dir(dir, scene.source.clone()).with_objects(scene.catalog());
    Console::new(setup)
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_outcome(outcome: &SubmitOutcome, scene: &DemoScene, raw_json: bool) {
    let output = scene.log.take();
    if raw_json {
        print_json(&serde_json::json!({ "outcome": outcome, "output": output }));
        return;
    }
    match outcome {
        SubmitOutcome::Executed { report, recorded } => {
            let mut line = format!("{}: ran on {} target(s)", report.command, report.invoked);
            if report.skipped_dead > 0 {
                line.push_str(&format!(", {} dead", report.skipped_dead));
            }
            if *recorded {
                line.push_str(", recorded");
            }
            println!("{line}");
            for failure in &report.failures {
                println!("  failed: {failure}");
            }
        }
        SubmitOutcome::Recorded { trigger } => println!("recorded into macro ({trigger})"),
        SubmitOutcome::Builtin { messages, .. } => {
            for message in messages {
                println!("{message}");
            }
        }
    }
    for line in output {
        println!("> {line}");
    }
}

fn print_replay(replay: &MacroReplay, scene: &DemoScene, raw_json: bool) {
    let output = scene.log.take();
    if raw_json {
        print_json(&serde_json::json!({ "replay": replay, "output": output }));
        return;
    }
    println!(
        "macro ({}): {} run, {} skipped",
        replay.trigger, replay.executed, replay.skipped
    );
    for line in output {
        println!("> {line}");
    }
}

fn print_view(view: &ConsoleView, raw_json: bool) {
    if raw_json {
        print_json(view);
        return;
    }
    println!("input:   {:?}", view.input);
    if let Some(command) = &view.command {
        let chips: Vec<String> = view
            .arguments
            .iter()
            .map(|a| if a.committed { format!("[{}]", a.text) } else { format!("[{}…]", a.text) })
            .collect();
        println!("command: {command} {}", chips.join(" "));
    }
    if let Some(pending) = &view.pending_parameter {
        println!("next:    {pending}");
    }
    if !view.remainder.is_empty() && view.command.is_some() {
        println!("unmatched: {:?}", view.remainder);
    }
    for hint in &view.hints {
        let marker = if hint.selected { ">" } else { " " };
        let disabled = if hint.enabled { "" } else { " (unresolved)" };
        println!("{marker} {}{disabled}", hint.text);
    }
    if view.can_submit {
        println!("(ready)");
    }
}

// ── Modes ───────────────────────────────────────────────────────

fn run_lines(console: &mut Console, scene: &DemoScene, lines: &[String], raw_json: bool) -> bool {
    let mut ok = true;
    for line in lines {
        if !console.is_open() {
            console.open();
        }
        match console.execute_text(line) {
            Ok(outcome) => print_outcome(&outcome, scene, raw_json),
            Err(e) => {
                eprintln!("Error: {e}");
                ok = false;
            }
        }
    }
    if console.is_open() {
        console.close();
    }
    ok
}

fn repl(console: &mut Console, scene: &DemoScene, raw_json: bool) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    console.open();
    loop {
        if !console.is_open() {
            console.open();
        }
        let prompt = match console.recording_trigger() {
            Some(trigger) => format!("rec({trigger})> "),
            None => "> ".to_string(),
        };
        print!("{prompt}");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(partial) = line.strip_prefix('?') {
            console.set_input(partial);
            print_view(&ConsoleView::of(console), raw_json);
            continue;
        }
        if let Some(trigger) = line.strip_prefix('!') {
            console.close();
            match console.trigger_macro(trigger.trim()) {
                Ok(replay) => print_replay(&replay, scene, raw_json),
                Err(e) => eprintln!("Error: {e}"),
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        match console.execute_text(line) {
            Ok(outcome) => print_outcome(&outcome, scene, raw_json),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    console.close();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dir = data_dir(cli.data_dir.as_deref());
    let raw = cli.json;
    let scene = DemoScene::new();
    let mut console = build_console(&scene, &dir);

    match &cli.command {
        Commands::Repl => repl(&mut console, &scene, raw),
        Commands::Run { lines } => {
            if !run_lines(&mut console, &scene, lines, raw) {
                process::exit(1);
            }
        }
        Commands::Hints { text, select } => {
            console.open();
            console.set_input(text.as_str());
            if let Some(steps) = select {
                console.navigate(*steps);
                console.insert_selected_hint();
            }
            print_view(&ConsoleView::of(&console), raw);
        }
        Commands::History => {
            console.open();
            let records = console.history().records();
            if raw {
                let lines: Vec<_> = records
                    .iter()
                    .map(|r| serde_json::json!({ "line": r.display, "state": r.state }))
                    .collect();
                print_json(&lines);
            } else {
                for record in records {
                    let mark = if record.is_resolved() { " " } else { "?" };
                    println!("{mark} {}", record.display);
                }
            }
        }
        Commands::Commands { topic } => {
            console.open();
            if raw {
                print_json(&command_list(console.registry()));
            } else {
                println!("{}", help_text(console.registry(), topic.as_deref()));
            }
        }
        Commands::Macro { trigger } => match console.trigger_macro(trigger) {
            Ok(replay) => print_replay(&replay, &scene, raw),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        },
        Commands::InitConfig => {
            let current = config::load_config(&dir).unwrap_or_default();
            if let Err(e) = config::save_config(&dir, &current) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            println!("{}", paths::config_path(&dir).display());
        }
    }
}
