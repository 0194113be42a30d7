use crate::dto::HealthRes;

/// Liveness reporting shared by every API surface.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Returns a `HealthRes` indicating the service is alive.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Scenario explorer is alive".into(),
        }
    }
}
