use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use stackup_exec::{ProcessOutput, ProcessSpec, SupervisedProcess, run, start};
use stackup_model::{AccountConfig, CliConfig, OutputLogConfig, ServiceEndpoint};
use tracing::info;

use crate::error::CoreError;

/// The deployment CLI under test.
///
/// Every invocation is `<program> <base_args...> <subcommand...>`. Nothing is
/// retried; a non-zero exit is an error carrying both output streams.
#[derive(Debug, Clone)]
pub struct Cli {
    cfg: CliConfig,
    stop_grace: Duration,
    output: OutputLogConfig,
}

impl Cli {
    pub fn new(cfg: CliConfig) -> Self {
        Self {
            cfg,
            stop_grace: ProcessSpec::DEFAULT_STOP_GRACE,
            output: OutputLogConfig::default(),
        }
    }

    /// Grace period for the detached `up` process.
    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn with_output_log(mut self, output: OutputLogConfig) -> Self {
        self.output = output;
        self
    }

    pub fn apps_dir(&self) -> &Path {
        &self.cfg.apps_dir
    }

    pub fn app_dir(&self, name: &str) -> PathBuf {
        self.cfg.apps_dir.join(name)
    }

    fn command<I, S>(&self, name: &str, args: I) -> ProcessSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProcessSpec::new(format!("cli-{name}"), &self.cfg.program)
            .args(self.cfg.base_args.iter().cloned())
            .args(args)
            .log(self.output)
    }

    pub fn login_spec(
        &self,
        control_plane: &ServiceEndpoint,
        registry: &ServiceEndpoint,
        account: &AccountConfig,
    ) -> ProcessSpec {
        self.command(
            "login",
            [
                "login",
                "--url",
                control_plane.base_url(),
                "--username",
                account.username.as_str(),
                "--password",
                account.password.as_str(),
                "--bindle-server",
                registry.base_url(),
            ],
        )
    }

    pub fn install_templates_spec(&self, args: &[String]) -> ProcessSpec {
        self.command("templates", ["templates", "install"])
            .args(args.iter().cloned())
    }

    pub fn update_plugins_spec(&self) -> ProcessSpec {
        self.command("plugin-update", ["plugin", "update"])
    }

    pub fn install_plugin_spec(&self, plugin: &str) -> ProcessSpec {
        self.command("plugin-install", ["plugin", "install", plugin, "--yes"])
    }

    pub fn new_app_spec(&self, template: &str, name: &str) -> ProcessSpec {
        self.command("new", ["new", template, name, "--accept-defaults"])
            .cwd(self.apps_dir())
    }

    pub fn build_spec(&self, name: &str) -> ProcessSpec {
        self.command("build", ["build"]).cwd(self.app_dir(name))
    }

    pub fn serve_spec(&self, name: &str, listen: &str, args: &[String]) -> ProcessSpec {
        self.command("up", ["up", "--listen", listen])
            .args(args.iter().cloned())
            .cwd(self.app_dir(name))
            .stop_grace(self.stop_grace)
    }

    pub async fn login(
        &self,
        control_plane: &ServiceEndpoint,
        registry: &ServiceEndpoint,
        account: &AccountConfig,
    ) -> Result<ProcessOutput, CoreError> {
        Ok(run(&self.login_spec(control_plane, registry, account)).await?)
    }

    pub async fn install_templates(&self, args: &[String]) -> Result<ProcessOutput, CoreError> {
        Ok(run(&self.install_templates_spec(args)).await?)
    }

    /// `plugin update`, then `plugin install <p> --yes` for each plugin in order.
    /// Stops at the first failure.
    pub async fn install_plugins(&self, plugins: &[String]) -> Result<(), CoreError> {
        run(&self.update_plugins_spec()).await?;
        for plugin in plugins {
            run(&self.install_plugin_spec(plugin)).await?;
            info!(%plugin, "plugin installed");
        }
        Ok(())
    }

    pub async fn new_app(&self, template: &str, name: &str) -> Result<ProcessOutput, CoreError> {
        Ok(run(&self.new_app_spec(template, name)).await?)
    }

    pub async fn build(&self, name: &str) -> Result<ProcessOutput, CoreError> {
        Ok(run(&self.build_spec(name)).await?)
    }

    /// Start `up` for `name` detached, with its output captured.
    pub fn serve(
        &self,
        name: &str,
        listen: &str,
        args: &[String],
    ) -> Result<SupervisedProcess, CoreError> {
        Ok(start(&self.serve_spec(name, listen, args))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> Cli {
        Cli::new(CliConfig {
            program: "spin".into(),
            base_args: vec!["--verbose".into()],
            apps_dir: PathBuf::from("/work/apps"),
        })
    }

    #[test]
    fn login_passes_both_service_urls() {
        let spec = cli().login_spec(
            &ServiceEndpoint::local(5309, ""),
            &ServiceEndpoint::local(8080, "/v1"),
            &AccountConfig::default(),
        );

        assert_eq!(spec.program(), "spin");
        assert_eq!(
            spec.arguments(),
            [
                "--verbose",
                "login",
                "--url",
                "http://127.0.0.1:5309",
                "--username",
                "e2e",
                "--password",
                "password",
                "--bindle-server",
                "http://127.0.0.1:8080/v1",
            ]
        );
    }

    #[test]
    fn templates_forward_caller_arguments() {
        let args = vec!["--git".to_string(), "https://example.test/templates".to_string()];
        let spec = cli().install_templates_spec(&args);
        assert_eq!(
            spec.arguments(),
            ["--verbose", "templates", "install", "--git", "https://example.test/templates"]
        );
    }

    #[test]
    fn plugin_install_is_non_interactive() {
        let spec = cli().install_plugin_spec("js2wasm");
        assert_eq!(spec.arguments(), ["--verbose", "plugin", "install", "js2wasm", "--yes"]);
    }

    #[test]
    fn new_app_runs_in_apps_dir() {
        let spec = cli().new_app_spec("http-rust", "hello");
        assert_eq!(
            spec.arguments(),
            ["--verbose", "new", "http-rust", "hello", "--accept-defaults"]
        );
        assert_eq!(spec.working_dir(), Some(Path::new("/work/apps")));
    }

    #[test]
    fn build_and_serve_run_in_app_dir() {
        let c = cli();
        assert_eq!(c.build_spec("hello").working_dir(), Some(Path::new("/work/apps/hello")));

        let spec = c.serve_spec("hello", "127.0.0.1:3000", &["--follow-all".to_string()]);
        assert_eq!(
            spec.arguments(),
            ["--verbose", "up", "--listen", "127.0.0.1:3000", "--follow-all"]
        );
        assert_eq!(spec.working_dir(), Some(Path::new("/work/apps/hello")));
    }

    #[test]
    fn every_command_carries_output_logging() {
        let output = OutputLogConfig {
            stdout_info: true,
            ..OutputLogConfig::default()
        };
        let c = cli().with_output_log(output);

        assert_eq!(c.build_spec("hello").output_log(), &output);
        assert_eq!(c.serve_spec("hello", "127.0.0.1:3000", &[]).output_log(), &output);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let c = Cli::new(CliConfig {
            program: "sh".into(),
            base_args: vec!["-c".into(), "echo denied >&2; exit 3".into(), "sh".into()],
            apps_dir: PathBuf::from("."),
        });

        let err = c.build(".").await.unwrap_err();
        match err {
            CoreError::Exec(stackup_exec::ExecError::NonZeroExit { code, stderr, .. }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "denied\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
