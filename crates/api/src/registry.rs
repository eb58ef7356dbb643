//! Named services shared between endpoints.
//!
//! Modules register their services once at startup; handlers call them by
//! name. Registering a name twice is an error, never an overwrite.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::response::{ApiError, ApiResult};

pub type ServiceFuture = Pin<Box<dyn Future<Output = ApiResult<Value>> + Send>>;

type ServiceFn = Arc<dyn Fn(Value) -> ServiceFuture + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("service '{0}' is already registered")]
    Duplicate(String),
}

#[derive(Default)]
pub struct ServiceRegistryBuilder {
    services: HashMap<String, ServiceFn>,
}

impl ServiceRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(&mut self, name: impl Into<String>, service: F) -> Result<&mut Self, RegistryError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<Value>> + Send + 'static,
    {
        match self.services.entry(name.into()) {
            Entry::Occupied(entry) => Err(RegistryError::Duplicate(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(service = %entry.key(), "service registered");
                entry.insert(Arc::new(move |input: Value| -> ServiceFuture { Box::pin(service(input)) }));
                Ok(self)
            }
        }
    }

    pub fn build(self) -> ServiceRegistry {
        ServiceRegistry {
            services: self.services,
        }
    }
}

/// Frozen name → service map.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceFn>,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::new()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub async fn call(&self, name: &str, input: Value) -> ApiResult<Value> {
        let service = self
            .services
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::internal(format!("unknown service '{name}'")))?;
        service(input).await
    }
}

impl core::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ServiceRegistry").field("services", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    async fn double(input: Value) -> ApiResult<Value> {
        let n = input
            .as_i64()
            .ok_or_else(|| ApiError::bad_request("expected a number"))?;
        Ok(json!(n * 2))
    }

    #[tokio::test]
    async fn registered_services_are_callable_by_name() {
        let mut builder = ServiceRegistry::builder();
        builder
            .register("double", double)
            .unwrap()
            .register("echo", |input| async move { Ok::<_, ApiError>(input) })
            .unwrap();
        let registry = builder.build();

        assert!(registry.contains("double"));
        assert_eq!(registry.call("double", json!(21)).await, Ok(json!(42)));
        assert_eq!(registry.call("echo", json!("hi")).await, Ok(json!("hi")));
        assert!(matches!(
            registry.call("double", json!("x")).await,
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut builder = ServiceRegistry::builder();
        builder.register("double", double).unwrap();

        let err = builder
            .register("double", |_| async { Ok::<_, ApiError>(Value::Null) })
            .err()
            .unwrap();
        assert_eq!(err, RegistryError::Duplicate("double".into()));
    }

    #[tokio::test]
    async fn first_registration_wins() {
        let mut builder = ServiceRegistry::builder();
        builder.register("double", double).unwrap();
        let _ = builder.register("double", |_| async { Ok::<_, ApiError>(json!("replaced")) });

        let registry = builder.build();
        assert_eq!(registry.call("double", json!(2)).await, Ok(json!(4)));
    }

    #[tokio::test]
    async fn unknown_service_is_internal_error() {
        let registry = ServiceRegistry::default();
        assert!(matches!(
            registry.call("missing", Value::Null).await,
            Err(ApiError::Internal(_))
        ));
        assert_eq!(format!("{registry:?}"), "ServiceRegistry { services: [] }");
    }
}
