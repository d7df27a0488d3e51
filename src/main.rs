//! Binary entry point: resolve configuration, start logging, prepare the
//! store, load every subject, and hand control to the terminal UI.
use study_organizer::{logging, run_app, App, Config, Store};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    logging::init(&config.log_path)?;
    tracing::info!(
        database = %config.database_path.display(),
        schema_mode = ?config.schema_mode,
        "starting study organizer"
    );

    let store = Store::from_config(&config)?;
    let subjects = store.load_all_subjects()?;

    let mut app = App::new(store, subjects);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "terminal session ended with an error");
    }
    result
}
