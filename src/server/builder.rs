//! ServerBuilder for assembling the application state and router

use super::entity_registry::{EntityDescriptor, EntityRegistry};
use super::exposure::RestExposure;
use super::security::{with_rate_limit, with_security_headers};
use super::state::AppState;
use crate::auth::token::TokenIssuer;
use crate::config::AppConfig;
use crate::entities::{
    Bootcamp, BootcampDescriptor, Course, CourseDescriptor, Review, ReviewDescriptor, User,
    UserDescriptor,
};
use crate::outbound::blob::FsBlobWriter;
use crate::outbound::geocoder::geocoder_from_config;
use crate::outbound::mailer::mailer_from_config;
use crate::outbound::{BlobWriter, Geocoder, Mailer};
use crate::storage::InMemoryDataService;
use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builder for the DevCamper HTTP server
///
/// Collaborators not set explicitly are derived from the configuration.
///
/// ```rust,ignore
/// let config = AppConfig::load()?;
/// ServerBuilder::new().with_config(config).serve().await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    entity_registry: EntityRegistry,
    mailer: Option<Arc<dyn Mailer>>,
    geocoder: Option<Arc<dyn Geocoder>>,
    blobs: Option<Arc<dyn BlobWriter>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// A builder with default configuration and every resource registered
    pub fn new() -> Self {
        let mut entity_registry = EntityRegistry::new();
        entity_registry.register(Box::new(BootcampDescriptor));
        entity_registry.register(Box::new(CourseDescriptor));
        entity_registry.register(Box::new(ReviewDescriptor));
        entity_registry.register(Box::new(UserDescriptor));

        Self {
            config: AppConfig::default(),
            entity_registry,
            mailer: None,
            geocoder: None,
            blobs: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_blob_writer(mut self, blobs: Arc<dyn BlobWriter>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Register an additional resource
    pub fn register_entity(mut self, descriptor: impl EntityDescriptor + 'static) -> Self {
        self.entity_registry.register(Box::new(descriptor));
        self
    }

    /// Add routes mounted outside the API prefix
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Create the stores and resolve the collaborators
    fn build_state(&mut self) -> Result<AppState> {
        let config = &self.config;

        let mailer = match self.mailer.take() {
            Some(mailer) => mailer,
            None => mailer_from_config(config.mail.as_ref()).context("failed to set up mailer")?,
        };
        let geocoder = match self.geocoder.take() {
            Some(geocoder) => geocoder,
            None => geocoder_from_config(config.geocoder.as_ref())
                .context("failed to set up geocoder")?,
        };
        let blobs: Arc<dyn BlobWriter> = match self.blobs.take() {
            Some(blobs) => blobs,
            None => Arc::new(FsBlobWriter::new(config.uploads.path.clone())),
        };

        Ok(AppState {
            bootcamps: Arc::new(InMemoryDataService::<Bootcamp>::new()),
            courses: Arc::new(InMemoryDataService::<Course>::new()),
            reviews: Arc::new(InMemoryDataService::<Review>::new()),
            users: Arc::new(InMemoryDataService::<User>::new()),
            tokens: TokenIssuer::new(
                &config.auth.jwt_secret,
                chrono::Duration::days(config.auth.jwt_expire_days),
            ),
            mailer,
            geocoder,
            blobs,
            config: Arc::new(config.clone()),
        })
    }

    /// Build the router and hand back the state it runs on
    pub fn build_with_state(mut self) -> Result<(Router, AppState)> {
        let state = self.build_state()?;
        let custom_routes = std::mem::take(&mut self.custom_routes);

        let body_limit = self.config.uploads.max_file_bytes + MULTIPART_OVERHEAD_BYTES;
        let mut app = RestExposure::build_router(&self.entity_registry, state.clone(), custom_routes)
            .layer(DefaultBodyLimit::max(body_limit));

        let security = &self.config.security;
        if security.rate_limit.enabled {
            app = with_rate_limit(app, &security.rate_limit)?;
        }
        if security.headers {
            app = with_security_headers(app);
        }
        let app = app
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        tracing::debug!(
            entities = ?self.entity_registry.entity_types(),
            prefix = %self.config.server.api_prefix,
            "routes registered"
        );
        Ok((app, state))
    }

    pub fn build(self) -> Result<Router> {
        Ok(self.build_with_state()?.0)
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM
    pub async fn serve(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let production = self.config.server.production;
        let app = self.build()?;
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        tracing::info!(production, "Server listening on {}", addr);

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
