pub mod adapters;
pub mod core;
pub mod runtime;

use adapters::config::Settings;

/// Boots the workspace headless: loads config, opens storage, rehydrates and
/// seeds the store, then logs a usage summary.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    tokio_runtime.block_on(async {
        let settings = Settings::load_global();
        let app = runtime::bootstrap(settings)?;
        app.log_summary();
        if let Ok(store) = app.store.lock() {
            store.flush()?;
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
