//! rekh CLI: forward-chaining reasoner over knowledge files.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use rekh::item::{Fact, Item};
use rekh::kb::{KnowledgeBase, RetractionPolicy};
use rekh::parse;

#[derive(Parser)]
#[command(name = "rekh", version, about = "Forward-chaining deductive reasoner")]
struct Cli {
    /// Use the legacy removal cascade (never re-checks the asserted flag
    /// of dependents) instead of the checked one.
    #[arg(long, global = true)]
    legacy_cascade: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a knowledge file and show the resulting store, derivations
    /// included.
    Show {
        /// Path to a knowledge file (`fact:` / `rule:` lines).
        file: PathBuf,
    },

    /// Load a knowledge file and query it.
    Ask {
        /// Path to a knowledge file.
        file: PathBuf,
        /// Query statement, e.g. '(plays ?who)'.
        query: String,
        /// Emit the binding set as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Load a knowledge file, retract facts, and show what remains.
    Retract {
        /// Path to a knowledge file.
        file: PathBuf,
        /// Fact statements to retract, in order, e.g. '(team ada)'.
        #[arg(required = true)]
        facts: Vec<String>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let policy = if cli.legacy_cascade {
        RetractionPolicy::Legacy
    } else {
        RetractionPolicy::Checked
    };

    match cli.command {
        Commands::Show { file } => {
            let kb = load(&file, policy)?;
            print!("{kb}");
        }

        Commands::Ask { file, query, json } => {
            let kb = load(&file, policy)?;
            let statement = parse::parse_statement(&query).into_diagnostic()?;
            let result = kb
                .ask(&Item::Fact(Fact::new(statement)))
                .into_diagnostic()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).into_diagnostic()?
                );
            } else if result.is_empty() {
                println!("no matches");
            } else {
                println!("{result}");
            }
        }

        Commands::Retract { file, facts } => {
            let mut kb = load(&file, policy)?;
            for src in &facts {
                let statement = parse::parse_statement(src).into_diagnostic()?;
                kb.retract(&Item::Fact(Fact::new(statement)));
            }
            print!("{kb}");
        }
    }

    Ok(())
}

fn load(file: &Path, policy: RetractionPolicy) -> Result<KnowledgeBase> {
    let items = parse::load_file(file).into_diagnostic()?;
    let mut kb = KnowledgeBase::with_policy(policy);
    for item in items {
        kb.assert_item(item);
    }
    Ok(kb)
}
