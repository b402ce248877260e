mod cli;
mod commands;
mod config;
mod error;
mod output;
mod store;

use crate::{
    cli::{Args, Commands, OutputFormat},
    commands::CommandExecutor,
    config::AppConfig,
    error::Result,
    output::OutputManager,
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::process;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let output_format = args.output;
    let result = run(args).await;

    if let Err(e) = result {
        match output_format {
            OutputFormat::Json | OutputFormat::JsonCompact => {
                let error_json = serde_json::json!({
                    "status": "error",
                    "message": e.to_string(),
                });
                println!("{error_json}");
            }
            OutputFormat::Pretty => {
                error!("Application error: {}", e);
                #[cfg(feature = "colored-output")]
                {
                    eprintln!("{} {}", "Error:".red().bold(), e);
                }
                #[cfg(not(feature = "colored-output"))]
                {
                    eprintln!("Error: {}", e);
                }
            }
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;

    let config = AppConfig::load(args.config.as_deref())?.with_overrides(args.base_url, args.timeout);
    debug!(base_url = %config.base_url, "Loaded configuration");

    let output = OutputManager::new(config.colored, args.output);

    match args.command {
        Commands::Login {
            username,
            password,
            expires_in_mins,
        } => {
            let executor = CommandExecutor::new(&config, output).await?;
            executor.login(&username, &password, expires_in_mins).await?;
        }

        Commands::Me => {
            let executor = CommandExecutor::new(&config, output).await?;
            executor.me().await?;
        }

        Commands::Request { method, path, body } => {
            let executor = CommandExecutor::new(&config, output).await?;
            executor.request(&method, &path, body.as_deref()).await?;
        }

        Commands::Status => {
            let executor = CommandExecutor::new(&config, output).await?;
            executor.status().await?;
        }

        Commands::Logout => {
            let executor = CommandExecutor::new(&config, output).await?;
            executor.logout().await?;
        }

        Commands::Config { show, reset } => {
            if reset {
                AppConfig::reset(args.config.as_deref())?;
                println!("✓ Configuration reset to defaults");
            } else if show {
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
        }

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    let subscriber = tracing_subscriber::registry().with(filter);

    subscriber
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
    Ok(())
}
