mod app;
mod config;
mod error;
mod game;
mod input;
mod logging;
mod render;
mod track;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let settings = config::Settings::from_args(config::Args::parse())?;
    logging::init(settings.log_path.as_deref())?;
    app::run(settings)
}
