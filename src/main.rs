use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let cfg = holo_field::config::Config::parse();
    holo_field::app::run(cfg)
}
