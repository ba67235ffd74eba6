use std::sync::Arc;

use services::AssessmentServices;

pub trait UiApp: Send + Sync {
    fn services(&self) -> AssessmentServices;

    /// Whether proctored tests must run in fullscreen.
    fn fullscreen_required(&self) -> bool;
}

#[derive(Clone)]
pub struct AppContext {
    services: AssessmentServices,
    fullscreen_required: bool,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            services: app.services(),
            fullscreen_required: app.fullscreen_required(),
        }
    }

    #[must_use]
    pub fn services(&self) -> AssessmentServices {
        self.services.clone()
    }

    #[must_use]
    pub fn fullscreen_required(&self) -> bool {
        self.fullscreen_required
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
