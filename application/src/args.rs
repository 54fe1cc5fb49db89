//! [`Args`] definitions.

use clap::Parser;

/// Server of the crop marketplace.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Do not apply the embedded schema migrations on startup.
    ///
    /// Useful when the database schema is owned by another deployment.
    #[arg(long)]
    pub skip_migrations: bool,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}
