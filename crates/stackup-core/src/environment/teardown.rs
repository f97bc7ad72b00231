use tracing::{info, warn};

use crate::{error::TeardownError, launcher::ManagedService};

/// Shut down every service in order, continuing past failures.
///
/// Returns every collected cause, or `Ok(())` if all steps succeeded.
pub(crate) async fn sweep<'a, I>(services: I) -> Result<(), TeardownError>
where
    I: IntoIterator<Item = &'a mut dyn ManagedService>,
{
    let mut report = TeardownError::new();
    for service in services {
        let causes = service.shutdown().await;
        if causes.is_empty() {
            info!(service = service.name(), "service torn down");
        }
        for cause in causes {
            warn!(service = service.name(), error = %cause, "teardown step failed");
            report.push(cause);
        }
    }
    report.into_result()
}
