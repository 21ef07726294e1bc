//! Drawing Supporter CLI
//!
//! Command-line interface for annotating images with named text regions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use drawsup_core::{Annotations, Config, StoreError};

mod commands;
mod editor;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "drawsup")]
#[command(about = "Drawing Supporter - notes for your reference images")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long = "config", global = true)]
    config_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the annotation of an image
    #[command(alias = "open")]
    Show {
        /// Image file
        image: PathBuf,
    },
    /// Set one region of an image's annotation
    #[command(alias = "edit")]
    Set {
        /// Image file
        image: PathBuf,
        /// Region name (e.g. Exp, Memo, Tips, Other)
        region: String,
        /// New text (opens editor if not provided)
        text: Option<String>,
    },
    /// Search annotations
    Search {
        /// Text to look for (case-sensitive)
        query: String,
        /// Only search these regions (default: configured regions)
        #[arg(short, long = "region")]
        region: Vec<String>,
        /// Open the first matching image
        #[arg(long)]
        open: bool,
    },
    /// List the images linked from an annotation with `>>name` lines
    Links {
        /// Image file
        image: PathBuf,
        /// Open every linked image
        #[arg(long)]
        open: bool,
    },
    /// Show store statistics and orphaned records
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, root_dir, regions, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let result = run(Cli::parse());

    if let Err(e) = &result {
        let hint = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<StoreError>())
            .and_then(StoreError::recovery_suggestion);
        if let Some(hint) = hint {
            eprintln!("Hint: {}", hint);
        }
    }

    result
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work on the file itself
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config_file.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config_file.as_ref())?;
    logging::init(&config, cli.verbose);

    let annotations = Annotations::from_config(&config)?;

    match cli.command {
        Commands::Show { image } => {
            commands::annotation::show(&annotations, image, &config.regions, &output)
        }
        Commands::Set {
            image,
            region,
            text,
        } => commands::annotation::set(&annotations, image, region, text, &output),
        Commands::Search {
            query,
            region,
            open,
        } => commands::search::run(&annotations, query, region, &config.regions, open, &output),
        Commands::Links { image, open } => {
            commands::links::show(&annotations, image, open, &output)
        }
        Commands::Status => commands::status::show(&annotations, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_regions() {
        let cli = Cli::parse_from(["drawsup", "search", "hands", "-r", "Memo", "-r", "Tips"]);
        match cli.command {
            Commands::Search { query, region, open } => {
                assert_eq!(query, "hands");
                assert_eq!(region, vec!["Memo", "Tips"]);
                assert!(!open);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_parse_links() {
        let cli = Cli::parse_from(["drawsup", "links", "imgs/a.png", "--open"]);
        match cli.command {
            Commands::Links { image, open } => {
                assert_eq!(image, PathBuf::from("imgs/a.png"));
                assert!(open);
            }
            _ => panic!("expected links command"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["drawsup", "show", "a.png", "--json", "-vv"]);
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Show { .. }));
    }
}
