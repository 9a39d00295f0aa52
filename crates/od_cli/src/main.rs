//! Dungeon CLI
//!
//! Runs headless episodes with a random policy, validates config files and
//! prints the default configuration.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use od_core::stats::{NullStatsSink, StatsSink};
#[cfg(feature = "cli")]
use od_core::DungeonConfig;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "od_cli")]
#[command(about = "Run and inspect personality-driven dungeon episodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Run episodes with a random policy
    Run {
        /// Config file (.yaml, .yml or .json); defaults when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of episodes
        #[arg(long, default_value_t = 10)]
        episodes: u32,

        /// Override the arena seed from the config
        #[arg(long)]
        seed: Option<u64>,

        /// Seed for the random policy
        #[arg(long, default_value_t = 0)]
        policy_seed: u64,

        /// Cut off episodes longer than this many ticks
        #[arg(long, default_value_t = 100_000)]
        max_ticks: u64,

        /// Write per-episode CSV statistics under this directory
        #[arg(long)]
        stats_dir: Option<PathBuf>,

        /// Output summary JSON file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Check a config file and report the first problem
    Validate {
        /// Config file path
        config: PathBuf,
    },

    /// Print the default config
    DumpConfig {
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, episodes, seed, policy_seed, max_ticks, stats_dir, summary } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(seed) = seed {
                cfg.episode.seed = seed;
            }

            let sink: Box<dyn StatsSink> = match &stats_dir {
                Some(root) => {
                    cfg.episode.compute_episode_stats = true;
                    let sink = od_cli::CsvStatsSink::create(root)?;
                    println!("Statistics: {}", sink.dir().display());
                    Box::new(sink)
                }
                None => Box::new(NullStatsSink),
            };

            println!("Running {} episodes (seed {})", episodes, cfg.episode.seed);
            let options = od_cli::RunOptions { episodes, max_ticks_per_episode: max_ticks, policy_seed };
            let result = od_cli::run_episodes(cfg, sink, &options)?;
            print_summary(&result);

            if let Some(path) = summary {
                let json = serde_json::to_string_pretty(&result)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write summary: {}", path.display()))?;
                println!("Summary saved to: {}", path.display());
            }
        }

        Commands::Validate { config } => {
            let cfg = DungeonConfig::from_path(&config)
                .with_context(|| format!("Invalid config: {}", config.display()))?;
            println!(
                "{} is valid: {} agents, {} targets, {} lives",
                config.display(),
                cfg.episode.number_of_agents,
                cfg.episode.number_of_targets,
                cfg.episode.target_lives
            );
        }

        Commands::DumpConfig { format, out } => {
            let cfg = DungeonConfig::default();
            let text = match format {
                Format::Yaml => cfg.to_yaml_string()?,
                Format::Json => serde_json::to_string_pretty(&cfg)?,
            };
            match out {
                Some(path) => std::fs::write(&path, text)
                    .with_context(|| format!("Failed to write config: {}", path.display()))?,
                None => print!("{}", text),
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&Path>) -> Result<DungeonConfig> {
    match path {
        Some(path) => {
            DungeonConfig::from_path(path).with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Ok(DungeonConfig::default()),
    }
}

#[cfg(feature = "cli")]
fn print_summary(summary: &od_cli::RunSummary) {
    println!("\nEpisodes:        {}", summary.episodes);
    println!("Wins:            {} ({:.1}%)", summary.wins, summary.win_rate() * 100.0);
    println!("Timer failures:  {}", summary.timer_failures);
    println!("Target escapes:  {}", summary.escape_failures);
    if summary.truncated > 0 {
        println!("Cut off:         {}", summary.truncated);
    }
    println!("Ticks:           {}", summary.total_ticks);
    for (i, r) in summary.mean_agent_return.iter().enumerate() {
        println!("Agent {} return: {:.3}", i, r);
    }
    println!("Group return:    {:.3}", summary.mean_group_return);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("od_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
