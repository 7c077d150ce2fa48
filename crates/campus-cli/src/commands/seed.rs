use campus_server::get_configuration;
use campus_store::{StoreError, seed::seed_samples};
use color_eyre::owo_colors::OwoColorize;

use crate::CliError;

pub fn handle(include_samples: bool) -> Result<(), CliError> {
    let settings = get_configuration()?;
    let store = settings
        .db_settings
        .connect()
        .ok_or(StoreError::NotConfigured)?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(seed_samples(&store, include_samples));
    store.close();
    let report = report?;

    if report.total() == 0 {
        eprintln!(
            "ℹ️  Nothing to seed in '{}': collections already hold data or samples were skipped.",
            store.name().bold()
        );
    } else {
        eprintln!(
            "🌱 Seeded '{}': {} faculties, {} programs, {} news.",
            store.name().bold(),
            report.faculty.bright_green(),
            report.program.bright_green(),
            report.news.bright_green(),
        );
    }

    Ok(())
}
