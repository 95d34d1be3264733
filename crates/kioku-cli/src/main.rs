//! Kioku CLI
//!
//! Terminal flashcard trainer: manages the item database and runs quiz
//! sessions on top of kioku-core.

mod session;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use directories::ProjectDirs;
use kioku_core::{
    Config, DistractorPolicy, DomainStats, ItemStore, KnowledgeType, LearningItem, QuizEngine,
    SqliteStore, estimate,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Kioku - spaced repetition for kana, kanji and vocabulary
#[derive(Parser)]
#[command(name = "kioku")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spaced-repetition flashcards for Japanese")]
#[command(long_about = "Kioku quizzes you on kana, kanji and vocabulary, picking each question from a forgetting probability built on short-term and long-term memory scores.")]
struct Cli {
    /// Directory holding the item database and suspended sessions
    #[arg(long, env = "KIOKU_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// JSON file overriding scheduler and quiz settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import items from a JSON array
    Import {
        /// Path to the items file
        file: PathBuf,
    },

    /// Enable items for quizzes
    Enable {
        /// Knowledge type: kana, kanji or word
        kind: KnowledgeType,
        /// Item ids
        ids: Vec<u32>,
        /// Enable every item of the domain
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },

    /// Exclude items from quizzes
    Disable {
        /// Knowledge type: kana, kanji or word
        kind: KnowledgeType,
        /// Item ids
        ids: Vec<u32>,
        /// Disable every item of the domain
        #[arg(long, conflicts_with = "ids")]
        all: bool,
    },

    /// Show learning progress
    Stats {
        /// Only this knowledge type
        kind: Option<KnowledgeType>,
    },

    /// Dump the current forgetting probabilities
    Probabilities {
        /// Knowledge type: kana, kanji or word
        kind: KnowledgeType,
        /// Number of items to list, highest weight first
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Run an interactive quiz
    Quiz {
        /// Knowledge type: kana, kanji or word
        kind: KnowledgeType,
        /// Nine answers, one part of the question kanji left out
        #[arg(long)]
        composition: bool,
        /// Seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,
        /// Session state file, loaded if present and written on suspend
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Forget all scores of a knowledge type
    Reset {
        /// Knowledge type: kana, kanji or word
        kind: KnowledgeType,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr so it never mixes with quiz output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let data_dir = resolve_data_dir(cli.data_dir)?;
    let config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    std::fs::create_dir_all(&data_dir)?;
    let store = SqliteStore::new(Some(data_dir.join("kioku.db")))?;
    info!(path = %store.path().display(), "Opened item database");

    match cli.command {
        Commands::Import { file } => run_import(&store, &file),
        Commands::Enable { kind, ids, all } => run_set_enabled(&store, kind, &ids, all, true),
        Commands::Disable { kind, ids, all } => run_set_enabled(&store, kind, &ids, all, false),
        Commands::Stats { kind } => run_stats(&store, kind),
        Commands::Probabilities { kind, limit } => run_probabilities(&store, &config, kind, limit),
        Commands::Quiz {
            kind,
            composition,
            seed,
            resume,
        } => {
            let state_path = resume.unwrap_or_else(|| data_dir.join(format!("{}.session", kind)));
            run_quiz(&store, config, kind, composition, seed, &state_path)
        }
        Commands::Reset { kind, yes } => run_reset(&store, kind, yes),
    }
}

/// `--data-dir` / `KIOKU_DATA_DIR`, else the platform data directory
fn resolve_data_dir(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let proj_dirs = ProjectDirs::from("org", "kioku", "kioku")
        .context("could not determine the platform data directory")?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

/// Run import command
fn run_import(store: &SqliteStore, file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let items: Vec<LearningItem> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;

    let count = store.import_items(&items)?;
    println!("{} {} items", "Imported".green().bold(), count);

    for kind in KnowledgeType::ALL {
        let imported = items.iter().filter(|i| i.knowledge_type() == kind).count();
        if imported > 0 {
            println!("  {:6} {}", kind.as_str(), imported);
        }
    }
    Ok(())
}

/// Run enable/disable command
fn run_set_enabled(
    store: &SqliteStore,
    kind: KnowledgeType,
    ids: &[u32],
    all: bool,
    enabled: bool,
) -> anyhow::Result<()> {
    if !all && ids.is_empty() {
        bail!("give item ids or --all");
    }

    let changed = if all {
        store.set_all_enabled(kind, enabled)?
    } else {
        store.set_enabled(kind, ids, enabled)?
    };

    let verb = if enabled { "Enabled" } else { "Disabled" };
    println!("{} {} {} items", verb.green().bold(), changed, kind);
    if !all && changed < ids.len() {
        println!("{}", format!("{} ids not found", ids.len() - changed).yellow());
    }
    Ok(())
}

/// Run stats command
fn run_stats(store: &SqliteStore, kind: Option<KnowledgeType>) -> anyhow::Result<()> {
    println!("{}", "=== Kioku Learning Statistics ===".cyan().bold());

    let kinds = match kind {
        Some(kind) => vec![kind],
        None => KnowledgeType::ALL.to_vec(),
    };
    for kind in kinds {
        let stats = store.get_stats(kind)?;
        print_domain_stats(&stats);
    }
    Ok(())
}

fn print_domain_stats(stats: &DomainStats) {
    println!();
    println!("{}", stats.knowledge_type.as_str().to_uppercase().yellow().bold());
    println!("{}: {}", "Total Items".white().bold(), stats.total_items);
    println!("{}: {}", "Enabled".white().bold(), stats.enabled_items);

    if stats.enabled_items == 0 {
        println!("{}", "No enabled items.".dimmed());
        return;
    }

    let enabled = stats.enabled_items as usize;
    print_distribution_bar("Known", stats.short_term_known as usize, enabled, "green");
    print_distribution_bar("Long-term", stats.long_term_started as usize, enabled, "yellow");
    print_distribution_bar("Never asked", stats.never_asked as usize, enabled, "red");
}

/// Print a distribution bar
fn print_distribution_bar(label: &str, count: usize, total: usize, color: &str) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = match color {
        "green" => bar.green(),
        "yellow" => bar.yellow(),
        "red" => bar.red(),
        _ => bar.white(),
    };

    println!("  {:12} [{:30}] {:>5} ({:>5.1}%)", label, colored_bar, count, percentage);
}

/// Run probabilities command
fn run_probabilities(
    store: &SqliteStore,
    config: &Config,
    kind: KnowledgeType,
    limit: usize,
) -> anyhow::Result<()> {
    let scores = store.enabled_scores(kind)?;
    let min_last_asked = store.min_last_asked(kind)?;
    let now = chrono::Utc::now().timestamp();
    let data = estimate(&scores, min_last_asked, now, &config.srs);

    if data.is_empty() {
        println!("{}", format!("No enabled {} items.", kind).dimmed());
        return Ok(());
    }

    let c = &data.coefficients;
    println!("{}", format!("=== {} Forgetting Probabilities ===", kind).cyan().bold());
    println!("{}: {} ({} not yet known)", "Items".white().bold(), c.item_count, c.count_unknown);
    println!("{}: {:.2}", "Days Since Start".white().bold(), c.days_end);
    println!(
        "{}: short {:.3} / long {:.3}",
        "Total Weight".white().bold(),
        c.total_short_weight,
        c.total_long_weight
    );
    println!(
        "{}: short {:.3} x long {:.3}{}",
        "Coefficients".white().bold(),
        c.short_coefficient,
        c.long_coefficient,
        if c.degenerate { " (fallback)" } else { "" }
    );
    println!();

    let total = data.total_weight();
    let mut records = data.records.clone();
    records.sort_by(|a, b| b.final_probability.total_cmp(&a.final_probability));

    println!(
        "  {:>6}  {:>6} {:>6}  {:>6} {:>6}  {:>7}  {:>6}",
        "id", "short", "weight", "long", "weight", "days", "share"
    );
    for record in records.iter().take(limit) {
        let share = if total > 0.0 {
            record.final_probability / total * 100.0
        } else {
            0.0
        };
        println!(
            "  {:>6}  {:>6.3} {:>6.3}  {:>6.3} {:>6.3}  {:>7.1}  {:>5.1}%",
            record.item_id,
            record.short_score,
            record.short_weight,
            record.long_score,
            record.long_weight,
            record.days_since_asked,
            share
        );
    }
    Ok(())
}

/// Run quiz command
fn run_quiz(
    store: &SqliteStore,
    mut config: Config,
    kind: KnowledgeType,
    composition: bool,
    seed: Option<u64>,
    state_path: &Path,
) -> anyhow::Result<()> {
    if composition {
        if kind != KnowledgeType::Kanji {
            println!("{}", "Composition quizzes only leave out kanji parts.".yellow());
        }
        config.quiz.answer_count = 9;
        config.quiz.distractor_policy = DistractorPolicy::ExcludeOnePart;
    }

    let rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut engine =
        QuizEngine::with_rng(store, kind, config, rng).with_renderer(session::answer_text);

    if state_path.exists() {
        let blob = std::fs::read(state_path)?;
        match engine.load_state(&blob) {
            Ok(()) => {
                println!("{} {}", "Resumed session from".green(), state_path.display());
                std::fs::remove_file(state_path)?;
            }
            Err(e) => {
                tracing::warn!(
                    path = %state_path.display(),
                    error = %e,
                    "Ignoring unreadable session state"
                );
            }
        }
    }

    println!(
        "{}",
        "Answer with a number (suffix ~ if unsure), ? if you don't know, q to suspend.".dimmed()
    );
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    session::run(&mut engine, &mut stdin.lock(), &mut stdout, state_path)?;
    stdout.flush()?;
    Ok(())
}

/// Run reset command
fn run_reset(store: &SqliteStore, kind: KnowledgeType, yes: bool) -> anyhow::Result<()> {
    if !yes {
        print!("Reset all {} scores? This cannot be undone. [y/N] ", kind);
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    let count = store.reset_scores(kind)?;
    println!("{} {} {} items", "Reset".green().bold(), count, kind);
    Ok(())
}
