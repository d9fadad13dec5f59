//! Standalone validator for the selfbot configuration.
//!
//! Checks `config.json` and the username list without connecting to Revolt.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use revolt_selfbot::commands::KNOWN_COMMANDS;
use revolt_selfbot::config::{
    BotConfig, DEFAULT_CONFIG_PATH, DEFAULT_USERNAMES_PATH, UsernameList,
};

/// Selfbot configuration validator.
#[derive(Parser, Debug)]
#[command(name = "validate_config")]
#[command(about = "Validates the configuration files of the Revolt selfbot")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file to validate.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    file: PathBuf,

    /// Path to the username rotation list.
    #[arg(short, long, default_value = DEFAULT_USERNAMES_PATH)]
    usernames: PathBuf,

    /// Show the username list and command table.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    println!("Validating: {}", args.file.display());

    let config = match BotConfig::load_from_file(&args.file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let errors = config.validate_all();
    for error in &errors {
        println!("  ✗ Error: {error}");
    }

    // Descriptions for commands the bot does not implement are harmless but
    // probably a typo.
    let mut warnings = 0;
    for name in config.commands.keys() {
        if !KNOWN_COMMANDS.contains(&name.as_str()) {
            warnings += 1;
            println!("  ⚠ Warning: help lists unknown command '{name}'");
        }
    }

    if args.verbose {
        println!("\nPrefix: {:?}", config.prefix);
        for (name, desc) in &config.commands {
            println!("  {}{name}: {desc}", config.prefix);
        }
    }

    let rotation_enabled = config.username_rotation().is_some();
    match UsernameList::load_from_file(&args.usernames) {
        Ok(names) => {
            println!("\nUsernames: {} in {}", names.len(), args.usernames.display());
            if names.is_empty() && rotation_enabled {
                warnings += 1;
                println!("  ⚠ Warning: rotation is enabled but the list is empty");
            }
            if args.verbose {
                for (i, name) in names.iter().enumerate() {
                    println!("  {}. {name}", i + 1);
                }
            }
        }
        Err(e) if rotation_enabled => {
            warnings += 1;
            println!("\n  ⚠ Warning: rotation is enabled but {} is unreadable: {e}", args.usernames.display());
        }
        Err(_) => {}
    }

    println!();

    if errors.is_empty() {
        println!("✓ Configuration is valid!");
        if warnings > 0 {
            println!("  ({warnings} warning(s))");
        }
        ExitCode::SUCCESS
    } else {
        println!("✗ Validation failed: {} error(s)", errors.len());
        ExitCode::FAILURE
    }
}
