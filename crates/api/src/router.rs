//! Endpoint registration.
//!
//! Every endpoint is mounted at `/<name>` behind its own access check: `GET`
//! endpoints are evaluated as reads, `POST` endpoints as writes.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{MethodRouter, get, post},
};
use serde::Serialize;

use rfapi_acl::{Authorizer, EndpointSettings, Operation};

use crate::config::ApiConfig;
use crate::middleware::{AccessGuard, access_middleware};
use crate::registry::ServiceRegistry;
use crate::request::ApiRequest;
use crate::response::{ApiResult, respond};
use crate::session::{JwtSessionResolver, SessionResolver, SessionStore};

/// Shared, immutable state behind every endpoint.
#[derive(Clone)]
pub struct ApiState {
    pub authorizer: Arc<Authorizer>,
    pub sessions: Arc<dyn SessionResolver>,
    pub services: Arc<ServiceRegistry>,
}

impl ApiState {
    pub fn new(
        authorizer: Authorizer,
        sessions: Arc<dyn SessionResolver>,
        services: ServiceRegistry,
    ) -> Self {
        Self {
            authorizer: Arc::new(authorizer),
            sessions,
            services: Arc::new(services),
        }
    }

    /// Standard wiring: JWT-verified sessions looked up in `store`.
    pub fn from_config(
        config: &ApiConfig,
        store: Arc<dyn SessionStore>,
        services: ServiceRegistry,
    ) -> Self {
        let sessions = JwtSessionResolver::new(config.session_secret.as_bytes(), store);
        Self::new(config.authorizer(), Arc::new(sessions), services)
    }
}

/// Route builder.
///
/// ```ignore
/// let router = Api::new(state)
///     .get("orders", EndpointSettings::section("orders"), list_orders)
///     .post("orders", EndpointSettings::section("orders"), create_order)
///     .into_router();
/// ```
pub struct Api {
    state: ApiState,
    router: Router,
}

impl Api {
    pub fn new(state: ApiState) -> Self {
        Self {
            state,
            router: Router::new(),
        }
    }

    pub fn state(&self) -> &ApiState {
        &self.state
    }

    /// Mount a read endpoint at `GET /<name>`.
    ///
    /// # Panics
    ///
    /// If `GET /<name>` is already mounted.
    pub fn get<H, Fut, T>(self, name: &str, settings: EndpointSettings, handler: H) -> Self
    where
        H: Fn(ApiRequest, Arc<ServiceRegistry>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
        T: Serialize + 'static,
    {
        self.mount(name, settings, Operation::Read, handler)
    }

    /// Mount a write endpoint at `POST /<name>`.
    ///
    /// # Panics
    ///
    /// If `POST /<name>` is already mounted.
    pub fn post<H, Fut, T>(self, name: &str, settings: EndpointSettings, handler: H) -> Self
    where
        H: Fn(ApiRequest, Arc<ServiceRegistry>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
        T: Serialize + 'static,
    {
        self.mount(name, settings, Operation::Write, handler)
    }

    fn mount<H, Fut, T>(
        mut self,
        name: &str,
        settings: EndpointSettings,
        operation: Operation,
        handler: H,
    ) -> Self
    where
        H: Fn(ApiRequest, Arc<ServiceRegistry>) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
        T: Serialize + 'static,
    {
        let name = name.trim_matches('/');
        let guard = AccessGuard {
            endpoint: Arc::from(name),
            settings: Arc::new(settings),
            operation,
            authorizer: self.state.authorizer.clone(),
            sessions: self.state.sessions.clone(),
        };

        let services = self.state.services.clone();
        let endpoint = move |req: ApiRequest| {
            let handler = handler.clone();
            let services = services.clone();
            async move { respond(handler(req, services).await) }
        };

        let method_router: MethodRouter = match operation {
            Operation::Read => get(endpoint),
            Operation::Write => post(endpoint),
        };

        tracing::debug!(endpoint = name, operation = operation.as_str(), "endpoint mounted");
        self.router = self.router.route(
            &format!("/{name}"),
            method_router.route_layer(from_fn_with_state(guard, access_middleware)),
        );
        self
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
