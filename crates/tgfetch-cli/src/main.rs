//! CLI entry point - the composition root.
//!
//! Parses arguments, bootstraps the `CliContext` and routes each command to
//! its handler. Errors are printed once here and mapped to an exit code.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};

use tgfetch_cli::handlers::{self, channel::ChannelArgs, extract::ExtractArgs};
use tgfetch_cli::utils::signal::cancel_on_ctrl_c;
use tgfetch_cli::{Cli, CliConfig, CliError, Commands, bootstrap, init_tracing, load_env};

#[tokio::main]
async fn main() -> ExitCode {
    // .env first so clap's `env` fallbacks can see it
    load_env();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::from_cli(&cli)?;
    let ctx = bootstrap(config).await?;
    println!("Connected as {}", ctx.session.display_name);
    cancel_on_ctrl_c(ctx.cancel.clone());

    match command {
        Commands::Channel {
            locator,
            limit,
            options,
        } => {
            let args = ChannelArgs {
                locator,
                limit: *limit,
                options,
            };
            handlers::channel::execute(&ctx, args).await?;
        }
        Commands::Link { link, types } => {
            handlers::link::execute(&ctx, link, types.as_deref()).await?;
        }
        Commands::Links { file, options } => {
            handlers::links::execute(&ctx, file, options).await?;
        }
        Commands::Extract {
            locator,
            types,
            limit,
            save,
        } => {
            let args = ExtractArgs {
                locator,
                types: types.as_deref(),
                limit: *limit,
                save: *save,
            };
            handlers::extract::execute(&ctx, args).await?;
        }
    }

    Ok(())
}
