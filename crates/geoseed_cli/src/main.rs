//! geoseed: install per-country geographic datasets into SQLite.
//!
//! Usage examples
//! --------------
//!
//! - List countries with a dataset
//!   $ geoseed list
//!
//! - Check whether a country is installed
//!   $ geoseed --database geo.sqlite3 status "Costa Rica"
//!
//! - Install a country (fails if it is already installed)
//!   $ geoseed --database geo.sqlite3 install "Antigua and Barbuda"
//!
//! Datasets default to the directory bundled with `geoseed_core`; point
//! `--datasets` (or `GEOSEED_DATASET_DIR`) elsewhere to use your own.
mod args;

use crate::args::{CliArgs, Commands};
use anyhow::Context;
use clap::Parser;
use geoseed_core::db::open_db;
use geoseed_core::{
    init_logging, CountryLoader, DatasetSeedRunner, DirectoryCatalog, GeoseedConfig,
    InstallContext, LogTarget, SqliteGeoRepository, SqliteTransactionRunner,
};
use log::debug;
use rusqlite::Connection;
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = GeoseedConfig::from_env().with_overrides(args.overrides());

    let target = LogTarget::from_dir(config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;
    init_logging(&config.log_level, target)
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;
    debug!(
        "event=cli_start module=cli status=ok dataset_dir={} database={}",
        config.dataset_dir.display(),
        config.database_path.display()
    );

    let stdout = io::stdout();
    run(args.command, &config, &mut stdout.lock())
}

/// Executes one subcommand, writing its report to `out`.
fn run(command: Commands, config: &GeoseedConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    let catalog = DirectoryCatalog::new(&config.dataset_dir);

    match command {
        Commands::List => {
            let available = CountryLoader::list_available(&catalog).with_context(|| {
                format!("failed to list datasets in `{}`", config.dataset_dir.display())
            })?;
            for name in available.into_keys() {
                writeln!(out, "{name}")?;
            }
        }

        Commands::Status { country } => {
            let conn = open_database(config)?;
            let installed = with_install_context(&conn, &catalog, |ctx| {
                CountryLoader::create(ctx, country.as_str())?.is_installed()
            })?;
            writeln!(out, "{}", if installed { "installed" } else { "not installed" })?;
        }

        Commands::Install { country } => {
            let conn = open_database(config)?;
            let report = with_install_context(&conn, &catalog, |ctx| {
                CountryLoader::create(ctx, country.as_str())?.install()
            })
            .with_context(|| format!("failed to install {country}"))?;
            writeln!(
                out,
                "Installed {country}: {} country, {} regions, {} cities",
                report.countries, report.regions, report.cities
            )?;
        }
    }

    Ok(())
}

fn open_database(config: &GeoseedConfig) -> anyhow::Result<Connection> {
    open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })
}

fn with_install_context<T>(
    conn: &Connection,
    catalog: &DirectoryCatalog,
    f: impl FnOnce(InstallContext<'_>) -> geoseed_core::LoaderResult<T>,
) -> anyhow::Result<T> {
    let repo = SqliteGeoRepository::try_new(conn)?;
    let transactions = SqliteTransactionRunner::new(conn);
    let seeder = DatasetSeedRunner::new(catalog);
    let ctx = InstallContext {
        catalog,
        repo: &repo,
        transactions: &transactions,
        seeder: &seeder,
    };
    Ok(f(ctx)?)
}
