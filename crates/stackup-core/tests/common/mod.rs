#![allow(dead_code)]

use std::{
    collections::VecDeque,
    net::TcpListener as StdListener,
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{Router, http::StatusCode, routing::post};
use stackup_core::{CoreError, PortAllocator};
use stackup_model::{ReadinessPolicy, StackConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Hands out pre-reserved ports in order, then fails.
#[derive(Debug, Default)]
pub struct QueuedPorts(Mutex<VecDeque<u16>>);

impl QueuedPorts {
    pub fn new(ports: impl IntoIterator<Item = u16>) -> Self {
        Self(Mutex::new(ports.into_iter().collect()))
    }

    pub fn push(&self, port: u16) {
        self.0.lock().unwrap().push_back(port);
    }
}

impl PortAllocator for QueuedPorts {
    fn allocate(&self) -> Result<u16, CoreError> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CoreError::Allocation(std::io::Error::other("port queue exhausted")))
    }
}

/// Bound but never accepting; enough for a TCP readiness probe.
pub fn tcp_listener() -> (StdListener, u16) {
    let listener = StdListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Account endpoint answering every registration with `status` and `body`.
pub async fn account_server(status: StatusCode, body: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let app = Router::new().route("/api/accounts", post(move || async move { (status, body) }));
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    port
}

fn sleeper() -> (String, Vec<String>) {
    ("sh".into(), vec!["-c".into(), "sleep 30".into()])
}

/// Configuration where every service is a `sleep` and the network side is
/// played by in-process listeners.
pub struct Stage {
    pub config: StackConfig,
    pub ports: Arc<QueuedPorts>,
    pub apps: TempDir,
    listeners: Vec<StdListener>,
}

impl Stage {
    /// Scheduler and registry listeners plus an account endpoint replying `status`.
    pub async fn new(status: StatusCode, body: &'static str) -> Self {
        let (scheduler, scheduler_port) = tcp_listener();
        let (registry, registry_port) = tcp_listener();
        let control_plane_port = account_server(status, body).await;

        let mut stage = Self::bare();
        stage.config.scheduler.address = format!("127.0.0.1:{scheduler_port}");
        stage.ports.push(registry_port);
        stage.ports.push(control_plane_port);
        stage.listeners.extend([scheduler, registry]);
        stage
    }

    /// A healthy stack.
    pub async fn healthy() -> Self {
        Self::new(StatusCode::OK, "").await
    }

    /// Fake processes and short timeouts, but no listeners and no ports.
    pub fn bare() -> Self {
        let apps = TempDir::new().unwrap();
        let mut config = StackConfig::default();

        (config.scheduler.program, config.scheduler.args) = sleeper();
        (config.registry.program, config.registry.args) = sleeper();
        (config.control_plane.program, config.control_plane.args) = sleeper();
        config.readiness = ReadinessPolicy::new(Duration::from_secs(3), Duration::from_millis(50));
        config.bootstrap_timeout_ms = 2_000;
        config.stop_grace_ms = 2_000;
        config.cli.apps_dir = apps.path().to_path_buf();

        Self {
            config,
            ports: Arc::new(QueuedPorts::default()),
            apps,
            listeners: Vec::new(),
        }
    }

    /// Reserve a listening port for the next allocation, e.g. a deployed app.
    pub fn listen_next(&mut self) -> u16 {
        let (listener, port) = tcp_listener();
        self.ports.push(port);
        self.listeners.push(listener);
        port
    }

    pub fn app_dir(&self, name: &str) -> std::path::PathBuf {
        let dir = self.apps.path().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

pub fn exists(path: &Path) -> bool {
    path.try_exists().unwrap()
}
