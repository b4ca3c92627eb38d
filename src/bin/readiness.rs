#![forbid(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use ai_readiness::gateway::TracingUsageSink;
use ai_readiness::report::{self, csv_artifact, pdf_artifact, render_dashboard, Artifact};
use ai_readiness::session::{load_answers, MAX_RATING};
use ai_readiness::{
    AssistantConfig, AssistantError, Catalog, Rating, Recommendation, RecommendationRequester,
    Report, Scores, Session,
};

#[derive(Parser)]
#[command(name = "readiness", version, about = "AI readiness self-assessment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pillars and questions
    Questions {
        /// Catalog JSON (default: built-in six-layer framework)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the catalog as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Rate every question, show the dashboard, and export reports
    ///
    /// Without --answers the questions are asked interactively.
    Assess {
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Answers JSON: {"<pillar>": [ratings...]}
        #[arg(long)]
        answers: Option<PathBuf>,
        /// Write ai_readiness_report.csv and ai_readiness_report.pdf here
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Also ask the assistant for recommendations
        #[arg(long)]
        recommend: bool,
    },
    /// Ask the assistant for recommendations on a set of answers
    Recommend {
        #[arg(long)]
        catalog: Option<PathBuf>,
        #[arg(long)]
        answers: PathBuf,
        /// Print the prompt and exit without calling the service
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Questions { catalog, json } => {
            let catalog = load_catalog(catalog.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog.to_spec())?);
            } else {
                for pillar in catalog.pillars() {
                    println!("{}", pillar.name);
                    for q in &pillar.questions {
                        println!("  {}. {}", q.ordinal, q.text);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Assess {
            catalog,
            answers,
            out_dir,
            csv,
            pdf,
            json,
            recommend,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let mut session = Session::new(&catalog);
            match answers {
                Some(path) => session.apply_answers(&load_answers(path)?)?,
                None => collect_interactively(&mut session)?,
            }

            let scores = Scores::from_ratings(&session.collect())?;
            let report = Report::from_scores(&scores);
            println!("{}", render_dashboard(&report));

            let mut ok = true;

            let csv_targets = targets(out_dir.as_deref(), csv, report::CSV_FILE_NAME);
            if !csv_targets.is_empty() {
                let artifact = csv_artifact(&report);
                for path in &csv_targets {
                    write_artifact(path, &artifact)?;
                }
            }

            let pdf_targets = targets(out_dir.as_deref(), pdf, report::PDF_FILE_NAME);
            if !pdf_targets.is_empty() {
                match pdf_artifact(&report) {
                    Ok(artifact) => {
                        for path in &pdf_targets {
                            write_artifact(path, &artifact)?;
                        }
                    }
                    Err(err) => {
                        eprintln!("PDF export failed: {err}");
                        ok = false;
                    }
                }
            }

            if let Some(path) = json {
                std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                eprintln!("wrote {}", path.display());
            }

            if recommend && !request_recommendation(&scores).await {
                ok = false;
            }

            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Recommend {
            catalog,
            answers,
            dry_run,
        } => {
            let catalog = load_catalog(catalog.as_deref())?;
            let mut session = Session::new(&catalog);
            session.apply_answers(&load_answers(answers)?)?;
            let scores = Scores::from_ratings(&session.collect())?;

            if dry_run {
                println!("{}", ai_readiness::prompts::DEFAULT_PROMPT.render(&scores.pillars));
                return Ok(ExitCode::SUCCESS);
            }

            Ok(if request_recommendation(&scores).await {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, ai_readiness::CatalogError> {
    match path {
        Some(p) => Catalog::load(p),
        None => Ok(Catalog::builtin()),
    }
}

fn targets(out_dir: Option<&Path>, explicit: Option<PathBuf>, file_name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = out_dir {
        paths.push(dir.join(file_name));
    }
    if let Some(p) = explicit {
        paths.push(p);
    }
    paths
}

fn write_artifact(path: &Path, artifact: &Artifact) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &artifact.bytes)?;
    eprintln!("wrote {} ({})", path.display(), artifact.content_type);
    Ok(())
}

/// Prompt for each question on stdin. Enter keeps the current value; end of
/// input leaves the remaining questions at their current value.
fn collect_interactively(session: &mut Session<'_>) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    let catalog = session.catalog();

    println!("Rate each question from 0 (not started) to {MAX_RATING} (optimized).");
    for pillar in catalog.pillars() {
        println!();
        println!("{}", pillar.name);
        for q in &pillar.questions {
            loop {
                let current = session.rating(&pillar.name, q.ordinal)?;
                print!("  [{}/{}] {} [{current}]: ", q.ordinal, pillar.len(), q.text);
                stdout.flush()?;

                let mut line = String::new();
                if input.read_line(&mut line)? == 0 {
                    println!();
                    return Ok(());
                }
                let line = line.trim();
                if line.is_empty() {
                    break;
                }
                match line.parse::<u8>().ok().and_then(Rating::new) {
                    Some(rating) => {
                        session.rate(&pillar.name, q.ordinal, rating)?;
                        break;
                    }
                    None => println!("  please enter a whole number from 0 to {MAX_RATING}"),
                }
            }
        }
    }
    println!();
    Ok(())
}

/// Run the recommendation flow, printing either the advice or a message
/// describing why there is none. Returns whether advice was shown.
async fn request_recommendation(scores: &Scores) -> bool {
    match fetch_recommendation(scores).await {
        Ok(rec) => {
            println!("AI Assistant Recommendation\n");
            println!("{}", rec.text);
            true
        }
        Err(err) => {
            tracing::debug!(code = err.code(), request_id = err.request_id(), error = %err, "recommendation failed");
            eprintln!("{}", err.user_message());
            false
        }
    }
}

async fn fetch_recommendation(scores: &Scores) -> Result<Recommendation, AssistantError> {
    let config = AssistantConfig::from_env()?;
    let requester = RecommendationRequester::from_config(&config, Arc::new(TracingUsageSink))?;

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    eprintln!("Asking the assistant for recommendations (Ctrl-C to cancel)...");
    let result = requester.request(scores, Some(&cancel)).await;
    watcher.abort();
    result
}
