use clap::{Parser, Subcommand};
use kaiwa::prelude::*;
use kaiwa::sequence::sequence_files;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Validate, play and pack scripted conversation sequences
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate sequence files or directories of them
    Validate {
        /// Sequence JSON files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Hide informational diagnostics
        #[arg(short, long)]
        quiet: bool,
        /// Validate each sequence on its own, without checking cross-sequence targets
        #[arg(long)]
        isolated: bool,
    },
    /// Play a sequence interactively in the terminal
    Play {
        /// Directory of sequence JSON files
        dir: PathBuf,
        /// The sequence to start
        #[arg(short, long)]
        sequence: String,
        /// JSON object of initial variables, e.g. {"user.name": "Aiko"}
        #[arg(long)]
        vars: Option<String>,
        /// Message id to start at instead of the entry point
        #[arg(long)]
        start: Option<MessageId>,
    },
    /// Pack a directory of sequences into a binary catalog
    Pack {
        /// Directory of sequence JSON files
        dir: PathBuf,
        /// Where to write the catalog
        #[arg(short, long)]
        output: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kaiwa=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate {
            paths,
            json,
            quiet,
            isolated,
        } => run_validate(&paths, json, quiet, isolated),
        Command::Play {
            dir,
            sequence,
            vars,
            start,
        } => run_play(&dir, &sequence, vars.as_deref(), start).await,
        Command::Pack { dir, output } => run_pack(&dir, &output),
    }
}

fn run_validate(paths: &[PathBuf], json: bool, quiet: bool, isolated: bool) {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = sequence_files(path).unwrap_or_else(|e| exit_with_error(&e.to_string()));
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    let mut catalog = SequenceCatalog::new();
    let mut load_failures = 0;
    for file in &files {
        match Sequence::from_file(file) {
            Ok(sequence) => {
                if let Some(previous) = catalog.insert(sequence) {
                    eprintln!(
                        "Warning: sequence '{}' is defined more than once; using {}",
                        previous.sequence_id(),
                        file.display()
                    );
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                load_failures += 1;
            }
        }
    }

    let validator = SequenceValidator::new();
    let mut report = if isolated {
        let mut report = ValidationReport::new();
        for sequence in catalog.iter() {
            report.extend(validator.validate(sequence));
        }
        report
    } else {
        validator.validate_catalog(&catalog)
    };
    if quiet {
        report.info.clear();
    }

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize report: {}", e)));
        println!("{}", rendered);
    } else {
        for diagnostic in report.iter() {
            println!("{:<8}{}", diagnostic.severity, diagnostic);
        }
        println!(
            "\n{} sequences checked: {} errors, {} warnings, {} info",
            catalog.len(),
            report.errors.len(),
            report.warnings.len(),
            report.info.len()
        );
    }

    if load_failures > 0 || !report.is_valid() {
        std::process::exit(1);
    }
}

async fn run_play(dir: &Path, sequence_id: &str, vars: Option<&str>, start: Option<MessageId>) {
    let catalog = SequenceCatalog::from_dir(dir)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load sequences: {}", e)));
    let store = match vars {
        Some(path) => StoreSeed::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load vars '{}': {}", path, e)))
            .into_store(),
        None => InMemoryStore::new(),
    };
    let store = Arc::new(store);

    let sink = Arc::new(|event: &str, data: &Payload| -> std::result::Result<(), TriggerError> {
        println!("  (event '{}' with {} fields)", event, data.len());
        Ok(())
    });
    let conversation = Conversation::builder(Arc::new(catalog), store.clone())
        .event_sink(sink)
        .build();

    println!("--- Playing '{}' ---", sequence_id);
    let mut turn = conversation
        .advance(sequence_id, start)
        .await
        .unwrap_or_else(|e| exit_with_error(&e.to_string()));

    loop {
        print_messages(&turn);

        let (Some(pending), Some(cursor)) = (turn.pending.clone(), turn.cursor.clone()) else {
            println!("\n--- End of conversation ({:?}) ---", turn.stop_reason);
            break;
        };

        let next = match pending {
            PendingInput::Choice { options } => {
                for option in &options {
                    println!("  {}) {}", option.index + 1, option.text);
                }
                let index = loop {
                    let Some(answer) = prompt_for_input("Choose") else {
                        return;
                    };
                    match answer.parse::<usize>() {
                        Ok(n) if (1..=options.len()).contains(&n) => break n - 1,
                        _ => println!("Please enter a number between 1 and {}.", options.len()),
                    }
                };
                conversation.select_choice(&cursor, index).await
            }
            PendingInput::Text { placeholder, .. } => {
                let label = placeholder.unwrap_or_else(|| "Your answer".to_string());
                let Some(answer) = prompt_for_input(&label) else {
                    return;
                };
                conversation.submit_text(&cursor, &answer).await
            }
        };
        turn = next.unwrap_or_else(|e| exit_with_error(&e.to_string()));
    }

    if let Ok(variables) = store.snapshot() {
        println!("\n--- Variables ---");
        let mut entries: Vec<_> = variables.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            println!("{} = {}", key, value);
        }
    }
}

fn run_pack(dir: &Path, output: &str) {
    let start = Instant::now();
    let catalog = SequenceCatalog::from_dir(dir)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load sequences: {}", e)));

    let report = SequenceValidator::new().validate_catalog(&catalog);
    if !report.is_valid() {
        eprintln!(
            "Warning: packing {} sequences with {} validation errors",
            catalog.len(),
            report.errors.len()
        );
    }

    catalog
        .save(output)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to write catalog: {}", e)));
    println!(
        "Packed {} sequences into '{}' in {:?}",
        catalog.len(),
        output,
        start.elapsed()
    );
}

fn print_messages(turn: &Turn) {
    for message in &turn.messages {
        let who = match message.sender {
            Sender::Bot => "bot",
            Sender::User => "you",
        };
        match &message.content {
            MessageContent::Text(text) => println!("{:>4}: {}", who, text),
            MessageContent::Image(path) => println!("{:>4}: [image {}]", who, path),
        }
    }
}

/// Prompts and reads one trimmed line. `None` on end of input.
fn prompt_for_input(prompt_text: &str) -> Option<String> {
    print!("> {}: ", prompt_text);
    io::stdout().flush().ok()?;

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
