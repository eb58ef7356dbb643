//! HTTP API layer: request normalization, uniform responses, and
//! section-based access checks in front of every endpoint.

pub mod basic_config;
pub mod claims;
pub mod config;
pub mod context;
pub mod middleware;
pub mod registry;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod session;

pub use basic_config::{BasicConfig, BasicInfo};
pub use config::{ApiConfig, ConfigError, LoginUrls};
pub use registry::{RegistryError, ServiceRegistry, ServiceRegistryBuilder};
pub use request::ApiRequest;
pub use response::{ApiError, ApiResult};
pub use router::{Api, ApiState};
pub use server::serve;
pub use session::{InMemorySessionStore, JwtSessionResolver, Session, SessionResolver, SessionStore};
