//! Environment controller: the cluster plus the CLI driven against it.
mod cli;
mod local_cloud;
mod teardown;

pub use cli::Cli;
pub use local_cloud::{LocalCloud, StartupFailure};
pub(crate) use teardown::sweep;

use std::fmt;

use async_trait::async_trait;
use stackup_model::AppMetadata;
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, TeardownError};

/// Turns a deploy command's captured output into [`AppMetadata`].
///
/// Implemented for every `Fn(&str, &str) -> Result<AppMetadata, E>` with a
/// displayable `E`; the arguments are the app name and the captured stdout.
pub trait MetadataExtractor: Send + Sync {
    fn extract(&self, app: &str, logs: &str) -> Result<AppMetadata, CoreError>;
}

impl<F, E> MetadataExtractor for F
where
    F: Fn(&str, &str) -> Result<AppMetadata, E> + Send + Sync,
    E: fmt::Display,
{
    fn extract(&self, app: &str, logs: &str) -> Result<AppMetadata, CoreError> {
        self(app, logs).map_err(|e| CoreError::Extract {
            app: app.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Contract shared by test environments a deployment CLI can be exercised against.
#[async_trait]
pub trait Environment: Send + Sync {
    fn name(&self) -> &str;

    /// Authenticate the CLI against the control plane.
    async fn login(&mut self) -> Result<(), CoreError>;

    async fn install_templates(&mut self, args: &[String]) -> Result<(), CoreError>;

    async fn install_plugins(&mut self, plugins: &[String]) -> Result<(), CoreError>;

    /// Create application `name` from `template`.
    async fn new_app(&mut self, template: &str, name: &str) -> Result<(), CoreError>;

    async fn build(&mut self, name: &str) -> Result<(), CoreError>;

    /// Deploy `name` and describe the result with `extractor`.
    async fn deploy(
        &mut self,
        name: &str,
        args: &[String],
        extractor: &dyn MetadataExtractor,
    ) -> Result<AppMetadata, CoreError>;

    async fn stop_app(&mut self, name: &str) -> Result<(), CoreError>;

    /// Wait until `metadata` reports the most recent version of its app.
    async fn poll_for_latest_version(
        &mut self,
        cancel: &CancellationToken,
        metadata: &AppMetadata,
    ) -> Result<(), CoreError>;

    /// Stop everything the environment started. Safe to call repeatedly.
    async fn teardown(&mut self) -> Result<(), TeardownError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_errors_become_extract_errors() {
        let failing = |_: &str, _: &str| -> Result<AppMetadata, String> {
            Err("no route line in output".into())
        };

        let err = failing.extract("hello", "").unwrap_err();
        assert!(matches!(&err, CoreError::Extract { app, .. } if app == "hello"));
        assert!(err.to_string().contains("no route line in output"));
    }

    #[test]
    fn closure_results_pass_through() {
        let extractor = |app: &str, logs: &str| -> Result<AppMetadata, std::io::Error> {
            Ok(AppMetadata::new(app, logs.trim()))
        };

        let meta = extractor.extract("hello", "http://127.0.0.1:3000\n").unwrap();
        assert_eq!(meta, AppMetadata::new("hello", "http://127.0.0.1:3000"));
    }
}
