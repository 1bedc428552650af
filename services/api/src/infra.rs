use clinic_scores::config::AppConfig;
use clinic_scores::error::AppError;
use clinic_scores::scoring::EstablishmentId;
use clinic_scores::store::JsonFileStore;
use clinic_scores::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the environment configuration and installs tracing for a batch command.
pub(crate) fn load_settings() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn open_store(path: &Path) -> Result<JsonFileStore, AppError> {
    let store = JsonFileStore::open(path)?;
    tracing::info!(path = %store.path().display(), "opened signal store");
    Ok(store)
}

/// Trims command-line establishment ids and drops empty entries.
pub(crate) fn establishment_ids(raw: Vec<String>) -> Vec<EstablishmentId> {
    raw.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .map(EstablishmentId)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn establishment_ids_skip_blank_entries() {
        let ids = establishment_ids(vec![
            " c-1".to_string(),
            String::new(),
            "c-2 ".to_string(),
            "   ".to_string(),
        ]);
        assert_eq!(
            ids,
            vec![
                EstablishmentId("c-1".to_string()),
                EstablishmentId("c-2".to_string())
            ]
        );
    }
}
