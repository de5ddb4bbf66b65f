use tracing::warn;

use crate::{dto::health::HealthResponse, error::ServiceError, state::SharedState};

/// Probe storage connectivity, failing loudly when the backend is gone.
pub async fn health_status(state: &SharedState) -> Result<HealthResponse, ServiceError> {
    let store = state.require_store().await.inspect_err(|_| {
        warn!("storage unavailable (degraded mode)");
    })?;

    if let Err(err) = store.health_check().await {
        warn!(error = %err, "storage health check failed");
        return Err(err.into());
    }

    Ok(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::AuthVerifier;
    use crate::dao::entity_store::memory::MemoryEntityStore;
    use crate::state::AppState;

    #[tokio::test]
    async fn healthy_store_reports_ok() {
        let state = AppState::new(AuthVerifier::new(b"health-tests"));
        state.install_store(Arc::new(MemoryEntityStore::new())).await;

        let response = health_status(&state).await.expect("healthy");
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn missing_store_reports_degraded() {
        let state = AppState::new(AuthVerifier::new(b"health-tests"));

        let err = health_status(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }

    #[tokio::test]
    async fn unreachable_store_reports_unavailable() {
        let state = AppState::new(AuthVerifier::new(b"health-tests"));
        let store = Arc::new(MemoryEntityStore::new());
        state.install_store(store.clone()).await;
        store.set_offline(true);

        let err = health_status(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }
}
