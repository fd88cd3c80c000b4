use crate::{
    adapters::{
        http::app_state::AppState, persistence::csv_store::CsvFileStore,
        sheets::webhook::SheetWebhookStore,
    },
    app_error::AppError,
    infra::config::{AppConfig, StoreBackend},
    use_cases::registration::{RecordStore, RegistrationUseCases},
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Local => Arc::new(CsvFileStore::new(config.data_file.clone())),
        StoreBackend::Sheet => {
            let url = config
                .sheet_webhook_url
                .clone()
                .ok_or_else(|| AppError::Internal("sheet backend without a webhook URL".into()))?;
            Arc::new(SheetWebhookStore::new(url, config.http_timeout)?)
        }
    };

    let registration_use_cases = RegistrationUseCases::new(store);

    Ok(AppState {
        config: Arc::new(config),
        registration_use_cases: Arc::new(registration_use_cases),
    })
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "hadir=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
