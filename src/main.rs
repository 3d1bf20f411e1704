use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vital_rule::cli;
use vital_rule::config::VitalRuleConfig;

#[derive(Parser)]
#[command(name = "vitalrule")]
#[command(about = "Vital-sign alert rule engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load record files and evaluate alert rules
    Evaluate {
        /// Directory of *.txt record files (defaults to engine.data_dir)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Path to the configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only evaluate this subject
        #[arg(short, long)]
        subject: Option<i32>,

        /// Print alerts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that a single record line parses
    Parse {
        /// Record in file or compact message format
        #[arg(short, long)]
        line: String,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Commands::Evaluate {
            data,
            config,
            subject,
            json,
        } => {
            let config = match config {
                Some(path) => VitalRuleConfig::from_file(path)?,
                None => VitalRuleConfig::default(),
            };
            cli::init_logging(&config.logging);

            let data_dir = data.unwrap_or_else(|| config.engine.data_dir.clone());
            let results = cli::evaluate_directory(&data_dir, &config, subject)?;

            if json {
                println!("{}", cli::render_json(&results)?);
            } else {
                print!("{}", cli::render_text(&results));
            }
        }
        Commands::Parse { line } => {
            cli::init_logging(&VitalRuleConfig::default().logging);
            println!("{}", cli::check_line(&line)?);
        }
    }

    Ok(())
}
