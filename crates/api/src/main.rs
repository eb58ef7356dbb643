use std::sync::Arc;

use anyhow::Context;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use rfapi_acl::EndpointSettings;
use rfapi_api::{
    Api, ApiConfig, ApiRequest, ApiResult, ApiState, BasicConfig, InMemorySessionStore,
    ServiceRegistry, serve,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rfapi_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let store = Arc::new(InMemorySessionStore::new());
    let basic = BasicConfig::from_config(&config, store.clone());
    let state = ApiState::from_config(&config, store, ServiceRegistry::default());

    let router = Api::new(state)
        .basic_config("basicConfig", basic)
        .get("whoami", EndpointSettings::section("account"), whoami)
        .into_router();

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(app = %config.app_name, "serving");
    serve(listener, router).await?;
    Ok(())
}

async fn whoami(req: ApiRequest, _: Arc<ServiceRegistry>) -> ApiResult<Value> {
    Ok(json!({
        "user": req.user(),
        "rights": req.grant.section_rights,
        "readAdmin": req.grant.read_admin,
        "writeAdmin": req.grant.write_admin,
    }))
}
