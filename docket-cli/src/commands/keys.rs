use clap::Parser;
use docket_cli::calendar::Calendar;
use eyre::Context;

/// Issue a new application key
#[derive(Parser, Debug)]
pub struct GenerateKey {}

impl GenerateKey {
    pub async fn run(&self, calendar: &Calendar) -> eyre::Result<()> {
        let key = calendar
            .generate_key()
            .await
            .context("Failed to issue app key")?;

        println!("{key}");
        Ok(())
    }
}
