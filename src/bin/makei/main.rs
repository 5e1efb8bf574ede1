//! makei CLI - build IBM i projects with Bob

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use makei::util::diagnostic;
use makei::util::Shell;
use makei::BuildError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.verbose, cli.no_color);

    // Set up logging
    let filter = if shell.is_verbose() {
        EnvFilter::new("makei=debug")
    } else {
        EnvFilter::new("makei=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli, &shell) {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<BuildError>() {
                Some(err) => diagnostic::emit(&err.to_diagnostic(), shell.use_color()),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<ExitCode> {
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Compile(args) => commands::compile::execute(args, shell),
        Commands::Targets(args) => commands::targets::execute(args).map(|_| ExitCode::SUCCESS),
        Commands::Vars(args) => commands::vars::execute(args, shell).map(|_| ExitCode::SUCCESS),
        Commands::Info(args) => commands::info::execute(args).map(|_| ExitCode::SUCCESS),
        Commands::Completions(args) => {
            commands::completions::execute(args).map(|_| ExitCode::SUCCESS)
        }
    }
}
