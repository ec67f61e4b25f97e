//! bioprep - Biomedical NER corpus preparation CLI
//!
//! Usage:
//!   bioprep convert -i corpus.xml -o standoff/
//!   bioprep clean -i standoff/
//!   bioprep split -i standoff/
//!   bioprep blacklist build --gsc gscs/ --ssc calbc/ --entity DISO -o out/
//!   bioprep blacklist apply --ssc calbc/ --blacklist out/blacklist.txt -o out/
//!   bioprep prune -i standoff/ -b pmids.txt

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use bioprep_blacklist::{Blacklist, BlacklistParams, BLACKLIST_FILENAME};
use bioprep_core::PrepConfig;

#[derive(Parser)]
#[command(name = "bioprep")]
#[command(about = "Biomedical NER corpus preparation toolkit")]
#[command(version)]
struct Cli {
    /// TOML config file providing defaults for all commands
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print summaries as JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an IeXML corpus to standoff format
    Convert {
        /// IeXML input file
        #[arg(short, long)]
        input: PathBuf,
        /// Directory for the standoff output
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate and clean a standoff corpus in place
    Clean {
        /// Standoff corpus directory
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Partition a standoff corpus into train/valid/test
    Split {
        /// Standoff corpus directory
        #[arg(short, long)]
        input: PathBuf,
        /// Shuffle seed (overrides config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Build or apply an entity blacklist for a silver-standard corpus
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },
    /// Delete documents listed in a PMID blacklist from a standoff corpus
    Prune {
        /// Standoff corpus directory
        #[arg(short, long)]
        input: PathBuf,
        /// File of PMIDs, one per line
        #[arg(short, long)]
        blacklist: PathBuf,
    },
}

#[derive(Subcommand)]
enum BlacklistAction {
    /// Build a blacklist from gold corpora and a silver corpus
    Build {
        /// Top-level directory housing the gold-standard corpora
        #[arg(short, long)]
        gsc: PathBuf,
        /// Silver-standard corpus directory
        #[arg(short, long)]
        ssc: PathBuf,
        /// Entity type to blacklist, e.g. DISO (without the B-/I- prefix)
        #[arg(short, long)]
        entity: String,
        /// Output directory for blacklist.txt (and the rewritten corpus)
        #[arg(short, long)]
        output: PathBuf,
        /// Minimum candidate token length (overrides config)
        #[arg(long)]
        min_length: Option<usize>,
        /// Also rewrite the SSC with the freshly built blacklist
        #[arg(short, long)]
        replace: bool,
    },
    /// Apply an existing blacklist to a silver corpus
    Apply {
        /// Silver-standard corpus directory
        #[arg(short, long)]
        ssc: PathBuf,
        /// Path to an existing blacklist file
        #[arg(short, long)]
        blacklist: PathBuf,
        /// Output directory for the rewritten corpus
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PrepConfig> {
    match path {
        Some(path) => PrepConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => PrepConfig::from_env().context("reading config from environment"),
    }
}

/// Reject entity labels that already carry a BIO prefix
fn validate_entity(entity: &str) -> anyhow::Result<()> {
    if entity.is_empty() {
        bail!("entity type must not be empty");
    }
    if entity.starts_with("B-") || entity.starts_with("I-") {
        bail!("entity type should not include the B-/I- prefix (got {entity:?})");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Convert { input, output } => {
            let report = bioprep_standoff::convert_corpus(&input, &output, config.split.seed)?;
            if cli.json {
                println!(
                    "{}",
                    json!({ "written": report.written, "skipped": report.skipped })
                );
            } else {
                println!(
                    "Converted {} article(s) to {} ({} skipped)",
                    report.written,
                    output.display(),
                    report.skipped
                );
            }
        }

        Commands::Clean { input } => {
            let report = bioprep_standoff::clean_corpus(&input)?;
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "hidden_removed": report.hidden_removed,
                        "lone_removed": report.lone_removed,
                        "invalid_removed": report.invalid_removed,
                    })
                );
            } else {
                println!(
                    "Removed {} hidden file(s), {} lone file(s), {} invalid pair(s)",
                    report.hidden_removed, report.lone_removed, report.invalid_removed
                );
            }
        }

        Commands::Split { input, seed } => {
            let mut split_config = config.split.clone();
            if let Some(seed) = seed {
                split_config.seed = seed;
            }
            let report = bioprep_standoff::split_corpus(&input, &split_config)?;
            if cli.json {
                println!(
                    "{}",
                    json!({ "train": report.train, "valid": report.valid, "test": report.test })
                );
            } else {
                println!(
                    "Split corpus into {} train / {} valid / {} test document(s)",
                    report.train, report.valid, report.test
                );
            }
        }

        Commands::Blacklist { action } => match action {
            BlacklistAction::Build {
                gsc,
                ssc,
                entity,
                output,
                min_length,
                replace,
            } => {
                validate_entity(&entity)?;

                let mut params = BlacklistParams::from(&config.blacklist);
                if let Some(min_length) = min_length {
                    params.min_token_length = min_length;
                }

                let gold = bioprep_conll::index_gold(&gsc)?;
                let target = bioprep_conll::index_target(&ssc)?;
                let blacklist = bioprep_blacklist::build(&target, &gold, &entity, &params);

                std::fs::create_dir_all(&output)
                    .with_context(|| format!("creating {}", output.display()))?;
                let blacklist_path = output.join(BLACKLIST_FILENAME);
                blacklist.save(&blacklist_path)?;

                let rewritten = if replace {
                    Some(bioprep_blacklist::apply(&blacklist, &ssc, &output)?)
                } else {
                    None
                };

                if cli.json {
                    println!(
                        "{}",
                        json!({
                            "entries": blacklist.len(),
                            "blacklist": blacklist_path,
                            "files_rewritten": rewritten.as_ref().map(|r| r.files_written),
                            "lines_rewritten": rewritten.as_ref().map(|r| r.lines_rewritten),
                        })
                    );
                } else {
                    println!(
                        "Wrote {} blacklist entr(ies) to {}",
                        blacklist.len(),
                        blacklist_path.display()
                    );
                    if let Some(report) = rewritten {
                        println!(
                            "Rewrote {} line(s) across {} file(s) in {}",
                            report.lines_rewritten,
                            report.files_written,
                            report.output_dir.display()
                        );
                    }
                }
            }

            BlacklistAction::Apply {
                ssc,
                blacklist,
                output,
            } => {
                let blacklist = Blacklist::load(&blacklist)?;
                std::fs::create_dir_all(&output)
                    .with_context(|| format!("creating {}", output.display()))?;
                let report = bioprep_blacklist::apply(&blacklist, &ssc, &output)?;
                if cli.json {
                    println!(
                        "{}",
                        json!({
                            "files_rewritten": report.files_written,
                            "lines_rewritten": report.lines_rewritten,
                            "output_dir": report.output_dir,
                        })
                    );
                } else {
                    println!(
                        "Rewrote {} line(s) across {} file(s) in {}",
                        report.lines_rewritten,
                        report.files_written,
                        report.output_dir.display()
                    );
                }
            }
        },

        Commands::Prune { input, blacklist } => {
            let removed = bioprep_standoff::prune_documents(&input, &blacklist)?;
            if cli.json {
                println!("{}", json!({ "removed": removed }));
            } else {
                println!("Removed {removed} blacklisted document(s)");
            }
        }
    }

    Ok(())
}
