mod cli;
mod commands;
mod config;
mod paths;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Commands, DatasourceCommand, DriverCommand, RealmCommand, TargetArgs};
use config::{Config, Endpoint};
use std::io;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
    pub dry_run: bool,
    pub yes: bool,
    pub target: TargetArgs,
}

impl Context {
    /// Resolve the target from flags and `config.toml`
    pub fn endpoint(&self) -> Result<Endpoint> {
        let args = &self.target;
        // Ad hoc targets do not need a config file.
        let config = if args.url.is_some() || args.file.is_some() {
            Config::default()
        } else {
            Config::load()?
        };
        let endpoint = config::select_endpoint(
            &config,
            args.target.as_deref(),
            args.url.as_deref(),
            args.file.as_deref(),
            args.user.as_deref(),
        )?;
        log::debug!("Using target '{}'", endpoint.name());
        Ok(endpoint)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        quiet: cli.quiet,
        dry_run: cli.dry_run,
        yes: cli.yes,
        target: cli.target,
    };

    match cli.command {
        Commands::Datasource(cmd) => match cmd {
            DatasourceCommand::Add(args) => commands::datasource::add(&ctx, args),
            DatasourceCommand::Remove { name } => commands::datasource::remove(&ctx, &name),
        },
        Commands::Driver(cmd) => match cmd {
            DriverCommand::Add(args) => commands::driver::add(&ctx, args),
            DriverCommand::Remove { name } => commands::driver::remove(&ctx, &name),
        },
        Commands::Realm(cmd) => commands::realm::run(&ctx, cmd),
        Commands::ReadAttribute { address, name } => {
            commands::server::read_attribute(&ctx, &address, &name)
        }
        Commands::Version => commands::server::version(&ctx),
        Commands::Reload {
            if_required,
            timeout,
        } => commands::server::reload(&ctx, if_required, timeout),
        Commands::Targets => commands::targets::list(),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "wildcfg", &mut io::stdout());
            Ok(())
        }
    }
}
