//! Resource routers and the gateway that mounts them.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::routing::get;
use crudgate_query::{DocumentStore, Entity, QueryResult, Repository};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cors::CorsConfig;
use crate::handlers;

/// Prefix every resource is mounted under.
pub const API_PREFIX: &str = "/rest/v1";

/// Title reported by the root index.
pub const DEFAULT_TITLE: &str = "Hello API Handler";

/// Handler state for one entity type.
pub struct Resource<E: Entity> {
    name: Arc<str>,
    repository: Repository<E>,
}

impl<E: Entity> Clone for Resource<E> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            repository: self.repository.clone(),
        }
    }
}

impl<E: Entity> std::fmt::Debug for Resource<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("collection", &E::collection().to_string())
            .finish()
    }
}

impl<E: Entity> Resource<E> {
    /// Create a resource named `name` over a repository.
    pub fn new(name: impl Into<Arc<str>>, repository: Repository<E>) -> Self {
        Self {
            name: name.into(),
            repository,
        }
    }

    /// Resource name, the last path segment of its routes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The typed repository.
    pub fn repository(&self) -> &Repository<E> {
        &self.repository
    }
}

/// The five CRUD routes for one entity type, relative to its mount point.
pub fn crud_routes<E: Entity>(resource: Resource<E>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::read_by_filter::<E>).post(handlers::create::<E>),
        )
        .route(
            "/{id}",
            get(handlers::read::<E>)
                .put(handlers::update::<E>)
                .delete(handlers::delete::<E>),
        )
        .with_state(resource)
}

/// Builder for the full HTTP surface.
///
/// ```rust
/// use std::sync::Arc;
/// use crudgate_axum::Gateway;
/// use crudgate_query::MemoryStore;
///
/// let gateway = Gateway::new(Arc::new(MemoryStore::new()));
/// assert!(gateway.resource_names().is_empty());
/// let _router = gateway.into_router();
/// ```
pub struct Gateway {
    store: Arc<dyn DocumentStore>,
    title: String,
    names: Vec<String>,
    router: Router,
    cors: Option<CorsConfig>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("backend", &self.store.backend())
            .field("title", &self.title)
            .field("resources", &self.names)
            .field("cors", &self.cors)
            .finish()
    }
}

impl Gateway {
    /// Start a gateway over a document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            title: DEFAULT_TITLE.to_string(),
            names: Vec::new(),
            router: Router::new(),
            cors: None,
        }
    }

    /// Set the title shown by the root index.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Mount the CRUD routes for `E` under `/rest/v1/<name>`.
    pub fn resource<E: Entity>(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let repository = Repository::<E>::new(Arc::clone(&self.store));
        let routes = crud_routes(Resource::new(name.as_str(), repository));
        self.router = self.router.nest(&format!("{API_PREFIX}/{name}"), routes);
        self.names.push(name);
        self
    }

    /// Apply CORS to every route.
    pub fn cors(mut self, config: CorsConfig) -> Self {
        self.cors = Some(config);
        self
    }

    /// Names of the mounted resources.
    pub fn resource_names(&self) -> &[String] {
        &self.names
    }

    /// Build the router without CORS or tracing layers.
    pub fn into_router(self) -> Router {
        let index = json!({
            "title": self.title,
            "body": format!("Endpoints: {}", self.names.join(", ")),
        });
        self.router.route("/", get(move || async move { Json(index) }))
    }

    /// Build the router with request tracing and, if configured, CORS.
    pub fn into_service(self) -> QueryResult<Router> {
        let cors = self.cors.as_ref().map(CorsConfig::layer).transpose()?;
        info!(
            backend = self.store.backend(),
            resources = ?self.names,
            "gateway routes ready"
        );
        let mut router = self.into_router();
        if let Some(cors) = cors {
            router = router.layer(cors);
        }
        Ok(router.layer(TraceLayer::new_for_http()))
    }
}
