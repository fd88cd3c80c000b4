use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Delimited-text file on local disk.
    Local,
    /// Remote spreadsheet webhook endpoint.
    Sheet,
}

pub struct AppConfig {
    pub bind_addr: String,
    pub store_backend: StoreBackend,
    pub data_file: PathBuf,
    pub sheet_webhook_url: Option<String>,
    pub http_timeout: Duration,
    /// 0 disables the periodic headcount poll.
    pub count_poll_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR").unwrap_or("0.0.0.0:3000".to_string());

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or("local".to_string())
            .as_str()
        {
            "local" => StoreBackend::Local,
            "sheet" => StoreBackend::Sheet,
            other => panic!("STORE_BACKEND must be 'local' or 'sheet', got '{other}'"),
        };

        let data_file: PathBuf = env::var("DATA_FILE")
            .unwrap_or("data/attendance.csv".to_string())
            .into();

        let sheet_webhook_url = match store_backend {
            StoreBackend::Sheet => Some(
                env::var("SHEET_WEBHOOK_URL")
                    .expect("SHEET_WEBHOOK_URL must be set when STORE_BACKEND=sheet"),
            ),
            StoreBackend::Local => env::var("SHEET_WEBHOOK_URL").ok(),
        };

        let http_timeout_secs: u64 = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or("5".to_string())
            .parse()
            .expect("HTTP_TIMEOUT_SECS must be a valid number");

        let count_poll_seconds: u64 = env::var("COUNT_POLL_SECONDS")
            .unwrap_or("0".to_string())
            .parse()
            .expect("COUNT_POLL_SECONDS must be a valid number");

        Self {
            bind_addr,
            store_backend,
            data_file,
            sheet_webhook_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
            count_poll_seconds,
        }
    }
}
