use std::sync::Arc;

use axum::extract::FromRef;

use crate::{infra::config::AppConfig, use_cases::registration::RegistrationUseCases};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registration_use_cases: Arc<RegistrationUseCases>,
}

impl FromRef<AppState> for Arc<RegistrationUseCases> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registration_use_cases.clone()
    }
}
