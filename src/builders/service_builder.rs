//! Builders to construct an [`AllocationService`] from configuration.

use std::sync::Arc;

use crate::config::{AppConfig, EngineConfig};
use crate::core::{AllocationService, CaseStore, RegistrySource, SchedulerError};
use crate::infra::{ConfiguredStore, JsonFileRegistry};
use crate::util::clock::Clock;

/// Validating builder for [`AllocationService`].
pub struct ServiceBuilder {
    engine: EngineConfig,
    clock: Option<Arc<dyn Clock>>,
}

impl ServiceBuilder {
    /// Start from an engine configuration.
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            clock: None,
        }
    }

    /// Use `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the configuration and wire the service.
    pub fn build<S, R>(
        self,
        store: Arc<S>,
        registry: Arc<R>,
    ) -> Result<AllocationService<S, R>, SchedulerError>
    where
        S: CaseStore,
        R: RegistrySource,
    {
        self.engine
            .validate()
            .map_err(|e| SchedulerError::Backend(format!("config invalid: {e}")))?;
        let service = AllocationService::new(store, registry, self.engine);
        Ok(match self.clock {
            Some(clock) => service.with_clock(clock),
            None => service,
        })
    }
}

/// Build the service described by process settings: configured store, JSON
/// registry file and the optional policy file.
pub fn build_from_app_config(
    app: &AppConfig,
) -> Result<AllocationService<ConfiguredStore, JsonFileRegistry>, SchedulerError> {
    let engine = app
        .engine_config()
        .map_err(|e| SchedulerError::Backend(format!("config invalid: {e}")))?;
    let store = ConfiguredStore::from_config(app)?;
    tracing::debug!(
        "store backend {:?}, registry {}",
        app.store_backend,
        app.registry_path.display()
    );
    ServiceBuilder::new(engine).build(
        Arc::new(store),
        Arc::new(JsonFileRegistry::new(&app.registry_path)),
    )
}
