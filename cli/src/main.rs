use anyhow::Result;
use clap::Parser;
use search_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let output = run(&cli)?;
    print!("{output}");
    Ok(())
}
