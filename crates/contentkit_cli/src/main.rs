//! CLI smoke entry point.
//!
//! # Responsibility
//! - Resolve `CoreConfig` from the environment and open the configured store.
//! - Print deterministic version and active resource counts for local checks.

use contentkit_core::{
    core_version, init_logging, open_db, open_db_in_memory, CoreConfig, SqliteDocumentStore,
    WriteModel, ARTICLE, CATEGORY,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("contentkit: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = match config.db_path() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let store = SqliteDocumentStore::try_new(&conn)?;
    let articles = WriteModel::new(store, &ARTICLE).find_all()?.len();
    let categories = WriteModel::new(store, &CATEGORY).find_all()?.len();

    info!(
        "event=cli_summary module=cli status=ok articles={} categories={}",
        articles, categories
    );
    println!("contentkit_core version={}", core_version());
    println!("articles active={articles}");
    println!("categories active={categories}");
    Ok(())
}
