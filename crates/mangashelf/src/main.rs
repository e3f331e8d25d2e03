#[macro_use]
extern crate log;

mod commands;
mod config;

use clap::Parser;
use mangashelf_lib::error::Error;
use mangashelf_mangadex::MangaDex;
use mangashelf_store::{FileStore, Library};

use crate::commands::{App, Command};
use crate::config::Config;

#[derive(Parser)]
#[clap(version, about)]
struct Opts {
    /// Path to config file
    #[clap(long)]
    config: Option<String>,
    #[clap(subcommand)]
    cmd: Command,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let opts: Opts = Opts::parse();
    let config = Config::open(opts.config)?;

    debug!("config from {}: {:?}", config.path().display(), config);

    let catalogue = MangaDex::connect(&config.base_url, config.timeout())?;
    let library = Library::new(FileStore::open(&config.store_path)?);
    let app = App::new(catalogue, library, config);

    match app.run(opts.cmd).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Err(e @ (Error::Transport { .. } | Error::UnexpectedShape { .. })) => {
            eprintln!("failed to load: {e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
