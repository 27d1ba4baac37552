use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use prereq::config::{self, ConfigFile, JointConvention, MiningConfig};
use prereq::matrix::{load_matrix, IdColumn, ProbabilityMatrix};
use prereq::mining::{compute_statistics, mine, rank_rules};
use prereq::report::{self, OutputFormat};

/// prereq - discover prerequisite relations between skills
/// from probabilistic learner mastery estimates
#[derive(Parser)]
#[command(name = "prereq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Probabilistic association-rule mining of skill prerequisites", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover prerequisite edges
    Mine {
        #[command(flatten)]
        args: MiningArgs,
        /// Log a summary of intermediate counts
        #[arg(long)]
        explain: bool,
    },

    /// Rank every rule by its probability of meeting the thresholds
    Rank {
        #[command(flatten)]
        args: MiningArgs,
        /// Number of rules to show (all when omitted)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show expected support and confidence for every skill pair
    Stats {
        #[command(flatten)]
        args: MiningArgs,
    },

    /// Write a configuration template to .prereq/config.toml
    Init {
        /// Directory to create .prereq in (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct MiningArgs {
    /// Input CSV: header of skill names, one row of probabilities per learner
    input: PathBuf,

    /// Minimum expected joint support, in learners
    #[arg(long)]
    min_support: Option<f64>,

    /// Minimum confidence of a rule, in [0, 1]
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Also require this probability that a rule meets both thresholds
    #[arg(long)]
    min_probability: Option<f64>,

    /// Joint-mastery convention: product or minimum
    #[arg(long)]
    joint: Option<JointConvention>,

    /// Confidence difference under which both directions count as equal
    #[arg(long)]
    tolerance: Option<f64>,

    /// Require the contrapositive rule on the complement matrix
    #[arg(long)]
    complement: bool,

    /// Disable parallel pair computation
    #[arg(long)]
    sequential: bool,

    /// Learner identifier column: auto, present, absent
    #[arg(long, value_parser = parse_id_column)]
    id_column: Option<IdColumn>,

    /// Configuration file (defaults to .prereq/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

fn parse_id_column(s: &str) -> Result<IdColumn, String> {
    match s.to_lowercase().as_str() {
        "auto" => Ok(IdColumn::Auto),
        "present" | "yes" => Ok(IdColumn::Present),
        "absent" | "no" => Ok(IdColumn::Absent),
        other => Err(format!("unknown id column mode '{}' (auto, present, absent)", other)),
    }
}

impl MiningArgs {
    /// Merge the configuration file with command-line overrides
    fn settings(&self) -> Result<ConfigFile> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => config::get_prereq_dir()?.join("config.toml"),
        };
        let mut settings = config::load_config(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        debug!("Loaded settings from {}", config_path.display());

        if self.min_support.is_some() {
            settings.min_support = self.min_support;
        }
        if self.min_confidence.is_some() {
            settings.min_confidence = self.min_confidence;
        }
        if self.min_probability.is_some() {
            settings.min_probability = self.min_probability;
        }
        if let Some(joint) = self.joint {
            settings.joint = joint;
        }
        if let Some(tolerance) = self.tolerance {
            settings.direction_tolerance = tolerance;
        }
        if self.complement {
            settings.require_complement = true;
        }
        if self.sequential {
            settings.parallel = false;
        }
        if let Some(id_column) = self.id_column {
            settings.loader.id_column = id_column;
        }
        Ok(settings)
    }

    fn load(&self) -> Result<(ProbabilityMatrix, MiningConfig)> {
        let settings = self.settings()?;
        let matrix = load_matrix(&self.input, &settings.loader)
            .with_context(|| format!("Failed to load matrix from {}", self.input.display()))?;
        info!(
            "Loaded {} learners x {} skills from {}",
            matrix.learner_count(),
            matrix.skill_count(),
            self.input.display()
        );
        let config = settings.to_mining_config()?;
        Ok((matrix, config))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Results go to stdout, logs to stderr
        .init();

    match cli.command {
        Commands::Mine { args, explain } => {
            let (matrix, config) = args.load()?;
            let report = mine(&matrix, &config)?;
            if explain {
                for line in report::render_summary(&report).lines() {
                    info!("{}", line);
                }
            }
            print!("{}", report::render_report(&report, &config, args.format)?);
        }
        Commands::Rank { args, limit } => {
            let (matrix, config) = args.load()?;
            let mut ranked = rank_rules(&matrix, &config)?;
            if let Some(limit) = limit {
                ranked.truncate(limit);
            }
            print!("{}", report::render_ranking(&ranked, args.format)?);
        }
        Commands::Stats { args } => {
            // Thresholds are not needed to list statistics
            let settings = args.settings()?;
            let matrix = load_matrix(&args.input, &settings.loader)
                .with_context(|| format!("Failed to load matrix from {}", args.input.display()))?;
            let stats = compute_statistics(&matrix, settings.joint, settings.parallel)?;
            print!("{}", report::render_statistics(&matrix, &stats, args.format)?);
        }
        Commands::Init { dir, force } => {
            let base = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let prereq_dir = base.join(".prereq");
            std::fs::create_dir_all(&prereq_dir)?;

            let config_path = prereq_dir.join("config.toml");
            if config_path.exists() && !force {
                println!("⚠️  {} already exists (use --force to overwrite)", config_path.display());
                return Ok(());
            }
            config::save_config(&ConfigFile::default(), &config_path)?;
            info!("Initialized configuration at {}", config_path.display());
            println!("✅ Wrote {}", config_path.display());
            println!("   Set min_support and min_confidence there, or pass --min-support / --min-confidence");
        }
    }

    Ok(())
}
