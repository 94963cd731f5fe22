use restful_booker::{fixtures::ScenarioFixtures, BookerConfiguration, BookingApiScenario, Error};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "scenario aborted");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<bool, Error> {
    let configuration = BookerConfiguration::from_env()?;
    info!(base_url = configuration.base_url(), "running booking scenario");

    let mut scenario =
        BookingApiScenario::new(configuration.client()?, configuration.credentials().clone());
    let report = scenario.run(&ScenarioFixtures::default())?;

    let failed = report.failures().count();
    if failed == 0 {
        info!(steps = report.outcomes().len(), "all steps passed");
    } else {
        error!(failed, steps = report.outcomes().len(), "scenario failed");
    }

    Ok(report.is_success())
}
