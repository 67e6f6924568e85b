//! Quill CLI - Parse, check and complete data pack documents

mod config;
mod error;
mod loader;
mod report;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use quill_checker::{Engine, ReleaseVersion};
use quill_parser::command::CommandTree;
use quill_parser::{parse_document, Grammar};
use tracing_subscriber::prelude::*;
use walkdir::WalkDir;

use config::ProjectConfig;
use error::CliError;
use report::{render, Tally};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Schema-directed checker for data pack documents", version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and output the syntax tree as JSON
    Parse {
        /// Input file
        file: PathBuf,
        /// Grammar; guessed from the extension when omitted
        #[arg(short, long, value_enum)]
        grammar: Option<GrammarArg>,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Check files and directories against the project's schemas
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// List completions at a byte offset as JSON
    Complete {
        /// Input file
        file: PathBuf,
        /// Byte offset of the cursor
        #[arg(short, long)]
        offset: usize,
        /// Grammar; guessed from the extension when omitted
        #[arg(short, long, value_enum)]
        grammar: Option<GrammarArg>,
        #[command(flatten)]
        project: ProjectArgs,
    },
}

#[derive(clap::Args)]
struct ProjectArgs {
    /// Project config; defaults to quill.json under the root
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Project root that document paths are taken relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
    /// Targeted release, overriding the config
    #[arg(long)]
    release: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GrammarArg {
    Snbt,
    Json,
    Command,
}

impl From<GrammarArg> for Grammar {
    fn from(arg: GrammarArg) -> Self {
        match arg {
            GrammarArg::Snbt => Grammar::Snbt,
            GrammarArg::Json => Grammar::Json,
            GrammarArg::Command => Grammar::Command,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("QUILL_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Parse { file, grammar, pretty } => cmd_parse(&file, grammar, pretty),
        Commands::Check { paths, project } => cmd_check(&paths, &project).await,
        Commands::Complete {
            file,
            offset,
            grammar,
            project,
        } => cmd_complete(&file, offset, grammar, &project).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn cmd_parse(file: &Path, grammar: Option<GrammarArg>, pretty: bool) -> Result<ExitCode, CliError> {
    let source = std::fs::read_to_string(file).map_err(|e| CliError::read(file, e))?;
    let grammar = grammar_for(file, grammar)?;

    let doc = parse_document(&source, grammar, &CommandTree::builtin(), None);
    let json = if pretty {
        serde_json::to_string_pretty(&doc.root)?
    } else {
        serde_json::to_string(&doc.root)?
    };
    println!("{}", json);

    if doc.diagnostics.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    print_diagnostics(&file.display().to_string(), &source, &doc.diagnostics);
    Ok(ExitCode::FAILURE)
}

async fn cmd_check(paths: &[PathBuf], args: &ProjectArgs) -> Result<ExitCode, CliError> {
    let engine = Arc::new(load_engine(args).await?);
    let files = collect_documents(paths)?;
    tracing::info!(files = files.len(), "checking documents");

    // One blocking task per document; reports come back in input order
    let mut tasks = Vec::with_capacity(files.len());
    for (file, grammar) in files {
        let source = tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| CliError::read(&file, e))?;
        let relative = project_path(&file, &args.root);
        let engine = Arc::clone(&engine);
        let task = tokio::task::spawn_blocking(move || {
            let checked = engine.check_text(&source, grammar, Some(relative.as_str()), None);
            (source, checked.diagnostics)
        });
        tasks.push((file, task));
    }

    let mut total = Tally::default();
    for (file, task) in tasks {
        let (source, diagnostics) = task.await?;
        let tally = Tally::of(&diagnostics);
        total.add(tally);
        if diagnostics.is_empty() {
            println!("✓ {}", file.display());
        } else {
            println!(
                "✗ {} - {} errors, {} warnings, {} hints",
                file.display(),
                tally.errors,
                tally.warnings,
                tally.hints
            );
            print_diagnostics(&file.display().to_string(), &source, &diagnostics);
        }
    }

    println!(
        "{} errors, {} warnings, {} hints",
        total.errors, total.warnings, total.hints
    );
    Ok(if total.errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn cmd_complete(
    file: &Path,
    offset: usize,
    grammar: Option<GrammarArg>,
    args: &ProjectArgs,
) -> Result<ExitCode, CliError> {
    let source = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| CliError::read(file, e))?;
    if offset > source.len() {
        return Err(CliError::OffsetOutOfBounds {
            path: file.to_path_buf(),
            offset,
            len: source.len(),
        });
    }
    let grammar = grammar_for(file, grammar)?;
    let engine = load_engine(args).await?;

    let relative = project_path(file, &args.root);
    let items = engine.complete_text(&source, grammar, Some(relative.as_str()), offset, None);
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(ExitCode::SUCCESS)
}

async fn load_engine(args: &ProjectArgs) -> Result<Engine, CliError> {
    let mut config = ProjectConfig::discover(args.config.as_deref(), &args.root)?;
    if let Some(release) = &args.release {
        config.release = Some(release.parse::<ReleaseVersion>()?);
    }
    config.build_engine().await
}

fn grammar_for(file: &Path, grammar: Option<GrammarArg>) -> Result<Grammar, CliError> {
    grammar
        .map(Grammar::from)
        .or_else(|| Grammar::from_path(&file.to_string_lossy()))
        .ok_or_else(|| CliError::UnknownGrammar {
            path: file.to_path_buf(),
        })
}

/// Documents under `paths` with a known grammar, sorted; explicit files are always kept
fn collect_documents(paths: &[PathBuf]) -> Result<Vec<(PathBuf, Grammar)>, CliError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push((path.clone(), grammar_for(path, None)?));
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|source| CliError::Walk {
                path: path.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(grammar) = Grammar::from_path(&entry.path().to_string_lossy()) {
                files.push((entry.into_path(), grammar));
            }
        }
    }
    Ok(files)
}

/// `file` relative to `root` with `/` separators, used to pick the document type
fn project_path(file: &Path, root: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn print_diagnostics(name: &str, source: &str, diagnostics: &[quill_ast::Diagnostic]) {
    let color = std::io::stderr().is_terminal();
    let mut stderr = std::io::stderr().lock();
    if let Err(e) = render(name, source, diagnostics, color, &mut stderr) {
        tracing::warn!(error = %e, "failed to render diagnostics");
    }
}
