use anyhow::Context;
use chess_cli::Args;
use clap::Parser;
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    info!("starting with {args:?}");
    chess_cli::run(args).context("terminal session failed")
}
