//! # Scaffold CLI
//!
//! A command-line interface for generating and updating projects from
//! templates.
//!
//! This crate provides the main CLI application that allows users to:
//! - Copy a template into a new project directory, answering its questions
//! - Update an existing project to a newer template revision
//!
//! ## Usage
//!
//! ```bash
//! scaffold copy https://github.com/example/template my-project
//! scaffold update my-project
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
use commands::{copy_cmd::CopyArgs, update_cmd::UpdateArgs};

mod errors;

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Scaffold: generate and update projects from templates
#[derive(Parser)]
#[command(name = "scaffold")]
#[command(about = "Generate and update projects from templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a template into a new or empty project directory
    Copy(CopyArgs),

    /// Update an existing project to a newer template revision
    Update(UpdateArgs),
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(EnvFilter::from_env("SCAFFOLD_LOG"))
        .init();

    let cli = Cli::parse();
    let (verb, result) = match &cli.command {
        Commands::Copy(args) => ("copy", commands::copy_cmd::execute(args)),
        Commands::Update(args) => ("update", commands::update_cmd::execute(args)),
    };

    match result {
        Ok(()) => println!("{} {}", "done:".green().bold(), verb),
        Err(e) => {
            error!("Error: {e}");
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
