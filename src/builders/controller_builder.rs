//! Builders to construct admission controllers from configuration.

use std::sync::Arc;

use crate::config::ControllerConfig;
use crate::core::{
    AdmissionController, AdmissionError, AuditSink, CeilingRefresher, CeilingSource,
    ExecutionBackend, Spawn,
};

/// Builds an [`AdmissionController`] from a validated [`ControllerConfig`].
pub struct ControllerBuilder {
    cfg: ControllerConfig,
    audit: Option<Arc<dyn AuditSink>>,
}

impl ControllerBuilder {
    /// Start from a configuration. Validation happens in [`Self::build`].
    pub fn new(cfg: ControllerConfig) -> Self {
        Self { cfg, audit: None }
    }

    /// Configured controller name.
    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    /// Configuration being built from.
    pub const fn config(&self) -> &ControllerConfig {
        &self.cfg
    }

    /// Attach an audit sink to the built controller.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Validate the configuration and bind it to `backend`.
    pub fn build<B: ExecutionBackend>(self, backend: B) -> Result<AdmissionController<B>, AdmissionError> {
        self.cfg.validate()?;
        let mut controller = AdmissionController::with_limits(self.cfg.ceiling, backend, self.cfg.limits())?
            .with_name(self.cfg.name.clone());
        if let Some(audit) = self.audit {
            controller = controller.with_audit(audit);
        }
        tracing::debug!(
            "built controller {} (ceiling {}, page size {}, max pages {})",
            self.cfg.name,
            self.cfg.ceiling,
            self.cfg.page_size,
            self.cfg.max_pages
        );
        Ok(controller)
    }

    /// Build, and start a ceiling refresher when the configuration asks for one.
    ///
    /// The refresher stops as soon as it is dropped, so the caller must keep
    /// it alive for as long as the ceiling should keep refreshing.
    #[must_use = "dropping the returned refresher stops ceiling refresh"]
    pub fn build_with_refresh<B, C, S>(
        self,
        backend: B,
        source: C,
        spawner: &S,
    ) -> Result<(AdmissionController<B>, Option<CeilingRefresher>), AdmissionError>
    where
        B: ExecutionBackend,
        C: CeilingSource,
        S: Spawn,
    {
        let interval = self.cfg.refresh_interval();
        let controller = self.build(backend)?;
        let refresher = interval.map(|every| {
            CeilingRefresher::spawn(controller.ceiling_handle(), source, every, spawner)
        });
        Ok((controller, refresher))
    }
}
