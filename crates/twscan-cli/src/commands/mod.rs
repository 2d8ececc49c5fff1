mod scan;
mod universe;

use std::process::ExitCode;
use std::sync::Arc;

use twscan_core::{Catalog, HttpClient, NoopHttpClient, ReqwestHttpClient, YahooChartSource};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let catalog = Catalog::load(&cli.catalog)?;

    match &cli.command {
        Command::Scan(args) => scan::run(cli, args, &catalog).await,
        Command::Universe(args) => universe::run(args, &catalog),
    }
}

/// Build the market data source from the global transport flags.
pub fn build_source(cli: &Cli) -> YahooChartSource {
    let http_client: Arc<dyn HttpClient> = if cli.offline {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };

    YahooChartSource::new(http_client).with_timeout_ms(cli.timeout_ms)
}
