use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use http::HeaderMap;
use subgraph_authz::{HttpAuthorizer, ResourceScope, Session};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Serves the products subgraph over HTTP.
#[derive(Debug, Parser)]
#[command(name = "products-subgraph", version)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "PRODUCTS_LISTEN_ADDRESS", default_value = "127.0.0.1:4000")]
    listen_address: SocketAddr,
    /// Base URL of the authorization decision service
    #[arg(long, env = "AUTHORIZATION_URL")]
    authorization_url: Url,
    /// API key for the decision service, sent as a bearer token
    #[arg(long, env = "AUTHORIZATION_API_KEY")]
    authorization_api_key: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(args))
}

async fn serve(args: Args) -> anyhow::Result<()> {
    let mut authorizer = HttpAuthorizer::new(args.authorization_url);
    if let Some(api_key) = args.authorization_api_key {
        authorizer = authorizer.with_api_key(api_key);
    }

    let schema = products_subgraph::subgraph(Arc::new(authorizer))?;
    subgraph_schema::serve(schema, request_context, args.listen_address).await?;
    Ok(())
}

/// Attaches the caller's identity (from the `x-user-id` header) and a
/// fresh resource scope to every request.
fn request_context(headers: &HeaderMap, request: async_graphql::Request) -> async_graphql::Request {
    let user_id = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    request
        .data(Session::new(user_id))
        .data(ResourceScope::default())
}
