pub mod collaborators;
pub mod config;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

use crate::collaborators::{DialogFileSelector, DialogNotifier, DialogOutputLocator};
use crate::config::AppConfig;
use crate::pipeline::batch::{convert, BatchRunner};
use crate::pipeline::processor::build_processor;

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Using default configuration");
        AppConfig::default()
    });

    let runner = BatchRunner::new(build_processor(&config));
    let writer = config.output_format.writer();
    let outcome = convert(
        &runner,
        &DialogFileSelector,
        &DialogOutputLocator,
        writer.as_ref(),
        &DialogNotifier,
    );
    tracing::info!(?outcome, "Session finished");
}
