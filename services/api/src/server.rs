use crate::cli::ServeArgs;
use crate::infra::{cors_layer, AppState};
use crate::routes::with_course_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use edu_platform::bootstrap::{start_listening, ListenerHandle, RetryPolicy, TcpBinder};
use edu_platform::catalog::{CourseService, InMemoryCourseRepository};
use edu_platform::config::{AppConfig, MediaStorage};
use edu_platform::error::AppError;
use edu_platform::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Tripped by the panic hook; wakes the shutdown future and marks the run as failed.
#[derive(Debug, Default)]
pub(crate) struct FailureSignal {
    tripped: AtomicBool,
    notify: Notify,
}

impl FailureSignal {
    pub(crate) fn trip(&self) {
        self.tripped.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    pub(crate) fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    pub(crate) async fn wait(&self) {
        if self.is_tripped() {
            return;
        }
        self.notify.notified().await;
    }
}

/// Everything the running server owns, built once at startup.
pub(crate) struct ServerContext {
    config: AppConfig,
    listener: ListenerHandle<TcpListener>,
    readiness: Arc<AtomicBool>,
    failure: Arc<FailureSignal>,
}

impl ServerContext {
    pub(crate) async fn bind(
        config: AppConfig,
        readiness: Arc<AtomicBool>,
    ) -> Result<Self, AppError> {
        let host = config.server.ip_addr()?;
        let policy = RetryPolicy::new(config.server.max_port_retries);
        let listener = start_listening(&TcpBinder, host, config.server.port, policy).await?;

        Ok(Self {
            config,
            listener,
            readiness,
            failure: Arc::new(FailureSignal::default()),
        })
    }

    pub(crate) fn port(&self) -> u16 {
        self.listener.port()
    }

    /// Callback run by the panic hook: the server stops reporting ready and
    /// shuts down gracefully, and `serve` then fails.
    pub(crate) fn failure_handler(&self) -> impl Fn() + Send + Sync + 'static {
        let readiness = self.readiness.clone();
        let failure = self.failure.clone();
        move || {
            readiness.store(false, Ordering::Release);
            failure.trip();
        }
    }

    pub(crate) fn install_failure_hook(&self) {
        telemetry::install_panic_hook(self.failure_handler());
    }

    pub(crate) async fn serve(self, app: Router) -> Result<(), AppError> {
        let Self {
            config,
            listener,
            readiness,
            failure,
        } = self;

        let port = listener.port();
        if port != config.server.port {
            warn!(
                preferred = config.server.port,
                port, "preferred port unavailable, serving on fallback port"
            );
        }

        readiness.store(true, Ordering::Release);
        info!(environment = ?config.environment, port, "server is running");

        axum::serve(listener.into_listener(), app)
            .with_graceful_shutdown(shutdown_signal(failure.clone()))
            .await?;

        readiness.store(false, Ordering::Release);
        if failure.is_tripped() {
            error!("server stopped after an unhandled panic");
            return Err(AppError::Panicked);
        }
        info!("server shut down");
        Ok(())
    }
}

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(retries) = args.max_port_retries.take() {
        config.server.max_port_retries = retries;
    }

    telemetry::init(&config.telemetry)?;
    log_external_services(&config);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(CourseService::new(Arc::new(InMemoryCourseRepository::default())));

    let app = with_course_routes(catalog)
        .layer(Extension(app_state))
        .layer(cors_layer(&config.cors))
        .layer(prometheus_layer);

    let context = ServerContext::bind(config, readiness).await?;
    context.install_failure_hook();
    info!(port = context.port(), "listener ready");
    context.serve(app).await
}

fn log_external_services(config: &AppConfig) {
    match &config.database {
        Some(database) => info!(
            target_url = %database.redacted_target(),
            "document database configured; catalog still served from memory"
        ),
        None => warn!("MONGODB_URL not set; course catalog uses in-memory storage"),
    }

    match &config.media {
        MediaStorage::Configured(media) => {
            info!(cloud = %media.cloud_name, "media storage configured")
        }
        MediaStorage::Incomplete { missing } => {
            error!(?missing, "media storage credentials incomplete; uploads disabled")
        }
        MediaStorage::Disabled => info!("media storage not configured"),
    }
}

async fn shutdown_signal(failure: Arc<FailureSignal>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(err) => {
                error!(%err, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                error!(%err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = failure.wait() => {},
    }
}
