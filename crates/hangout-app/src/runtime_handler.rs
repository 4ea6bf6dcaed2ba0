use std::sync::Arc;

use hangout_core::error::CoreError;
use hangout_service::runtime::CoordinatorRuntime;
use salvo::async_trait;

use crate::error::AppResult;

/// Injects the coordinator runtime (and through it, the event store) into the depot.
pub struct RuntimeHandler {
    pub runtime: Arc<CoordinatorRuntime>,
}

#[async_trait]
impl salvo::Handler for RuntimeHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.runtime.clone());
    }
}

/// ## Summary
/// Retrieves the coordinator runtime from the depot.
///
/// ## Errors
/// Returns an error if the runtime is not found in the depot.
pub fn get_runtime_from_depot(depot: &salvo::Depot) -> AppResult<Arc<CoordinatorRuntime>> {
    depot
        .obtain::<Arc<CoordinatorRuntime>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Coordinator runtime not found in depot").into())
}
