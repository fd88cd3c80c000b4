use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    app_error::{AppError, AppResult},
    application::{export, validators},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Masterclass {
    #[serde(rename = "AI Fundamentals")]
    AiFundamentals,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Data Analysis")]
    DataAnalysis,
    #[serde(rename = "Digital Marketing")]
    DigitalMarketing,
}

impl Masterclass {
    pub const ALL: [Masterclass; 4] = [
        Masterclass::AiFundamentals,
        Masterclass::WebDevelopment,
        Masterclass::DataAnalysis,
        Masterclass::DigitalMarketing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Masterclass::AiFundamentals => "AI Fundamentals",
            Masterclass::WebDevelopment => "Web Development",
            Masterclass::DataAnalysis => "Data Analysis",
            Masterclass::DigitalMarketing => "Digital Marketing",
        }
    }

    pub fn from_label(label: &str) -> Option<Masterclass> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionDay {
    #[serde(rename = "Day 1")]
    Day1,
    #[serde(rename = "Day 2")]
    Day2,
    #[serde(rename = "Day 3")]
    Day3,
}

impl SessionDay {
    pub const ALL: [SessionDay; 3] = [SessionDay::Day1, SessionDay::Day2, SessionDay::Day3];

    pub fn label(self) -> &'static str {
        match self {
            SessionDay::Day1 => "Day 1",
            SessionDay::Day2 => "Day 2",
            SessionDay::Day3 => "Day 3",
        }
    }

    pub fn from_label(label: &str) -> Option<SessionDay> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// One persisted attendance row. The timestamp is assigned by the store at
/// append time; records are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masterclass: Option<Masterclass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionDay>,
}

/// A validated, trimmed registration ready to be stamped and appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub masterclass: Option<Masterclass>,
    pub session: Option<SessionDay>,
}

/// Raw form input as submitted by the client. `country_code`, when present,
/// is composed with a local phone number into an international one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub masterclass: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationMetadata {
    pub masterclasses: Vec<&'static str>,
    pub sessions: Vec<&'static str>,
}

/// Append-only record store. Backed by a local delimited-text file or by a
/// remote spreadsheet webhook; the caller cannot tell which.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads back every record currently in the store. A missing or
    /// unreadable backing store degrades to an empty list; the remote
    /// variant has no row read-back and also yields an empty list.
    async fn load(&self) -> AppResult<Vec<AttendanceRecord>>;

    /// Stamps the registration with the current instant and persists it as
    /// one new row. Timestamps are non-decreasing in append order within a
    /// single store.
    async fn append(&self, registration: &Registration) -> AppResult<AttendanceRecord>;

    /// Advisory headcount. `None` means unknown; never an error.
    async fn count(&self) -> Option<u64>;
}

#[derive(Clone)]
pub struct RegistrationUseCases {
    store: Arc<dyn RecordStore>,
}

impl RegistrationUseCases {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validates the form and appends one record. The store is never touched
    /// when validation fails.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: &RegistrationForm) -> AppResult<AttendanceRecord> {
        let registration = validate_form(form)?;
        self.store.append(&registration).await
    }

    pub async fn list(&self) -> AppResult<Vec<AttendanceRecord>> {
        self.store.load().await
    }

    pub async fn headcount(&self) -> Option<u64> {
        self.store.count().await
    }

    pub async fn export_csv(&self) -> AppResult<String> {
        Ok(export::to_csv(&self.store.load().await?))
    }

    pub async fn export_xlsx(&self) -> AppResult<Vec<u8>> {
        export::to_xlsx(&self.store.load().await?)
    }

    pub fn metadata(&self) -> RegistrationMetadata {
        RegistrationMetadata {
            masterclasses: Masterclass::ALL.iter().map(|m| m.label()).collect(),
            sessions: SessionDay::ALL.iter().map(|s| s.label()).collect(),
        }
    }
}

fn validate_form(form: &RegistrationForm) -> AppResult<Registration> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name must not be empty".to_string()));
    }

    let email = form.email.trim();
    if !validators::is_valid_email(email) {
        return Err(AppError::InvalidInput(
            "Email must look like name@domain.tld".to_string(),
        ));
    }

    let phone = compose_phone(form);
    if !validators::is_valid_phone(&phone) {
        return Err(AppError::InvalidInput(
            "Phone must be 7-15 digits with an optional leading +".to_string(),
        ));
    }

    let masterclass = match form.masterclass.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(label) => Some(
            Masterclass::from_label(label)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown masterclass: {label}")))?,
        ),
    };

    let session = match form.session.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(label) => Some(
            SessionDay::from_label(label)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown session: {label}")))?,
        ),
    };

    Ok(Registration {
        name: name.to_string(),
        email: email.to_string(),
        phone,
        masterclass,
        session,
    })
}

/// Prefixes the country code when the phone was entered as a local
/// subscriber number. A phone already carrying a `+` wins over the prefix.
fn compose_phone(form: &RegistrationForm) -> String {
    let phone = form.phone.trim();
    match form.country_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() && !phone.starts_with('+') => {
            format!("+{}{}", code.trim_start_matches('+'), phone)
        }
        _ => phone.to_string(),
    }
}
