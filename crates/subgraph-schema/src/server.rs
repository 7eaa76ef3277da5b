use std::{net::SocketAddr, sync::Arc};

use async_graphql::dynamic::Schema;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{extract::State, http::HeaderMap, routing::post, Router};

/// Builds the per-request context before execution.
///
/// The execution engine itself knows nothing about where identity comes
/// from; whatever data guarded resolvers expect (user identity, request
/// scoped maps) must be attached to the request here.
pub trait ContextBuilder: Send + Sync + 'static {
    fn build(&self, headers: &HeaderMap, request: async_graphql::Request) -> async_graphql::Request;
}

impl<F> ContextBuilder for F
where
    F: Fn(&HeaderMap, async_graphql::Request) -> async_graphql::Request + Send + Sync + 'static,
{
    fn build(&self, headers: &HeaderMap, request: async_graphql::Request) -> async_graphql::Request {
        self(headers, request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Cannot bind the listen address
    #[error("binding listen address: {0}")]
    Bind(#[source] std::io::Error),
    /// Cannot start the HTTP server
    #[error("starting server: {0}")]
    Server(#[source] std::io::Error),
}

#[derive(Clone)]
struct AppState {
    schema: Schema,
    context: Arc<dyn ContextBuilder>,
}

fn router(schema: Schema, context: Arc<dyn ContextBuilder>) -> Router {
    Router::new()
        .route("/", post(graphql_handler))
        .with_state(AppState { schema, context })
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let request = state.context.build(&headers, req.into_inner());
    state.schema.execute(request).await.into()
}

/// Serves the subgraph until interrupted.
pub async fn serve(
    schema: Schema,
    context: impl ContextBuilder,
    listen_address: SocketAddr,
) -> Result<(), ServerError> {
    let app = router(schema, Arc::new(context));
    let listener = tokio::net::TcpListener::bind(listen_address)
        .await
        .map_err(ServerError::Bind)?;
    let local_address = listener.local_addr().map_err(ServerError::Bind)?;
    tracing::info!("subgraph ready at http://{local_address}/");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
        .map_err(ServerError::Server)
}

/// A subgraph server running on a background task, shut down on drop.
/// Binding port 0 picks a free port, which is what tests want.
pub struct SubgraphServer {
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
    port: u16,
}

impl Drop for SubgraphServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
    }
}

impl SubgraphServer {
    pub async fn start(
        schema: Schema,
        context: impl ContextBuilder,
        listen_address: SocketAddr,
    ) -> Result<SubgraphServer, ServerError> {
        let app = router(schema, Arc::new(context));
        let listener = tokio::net::TcpListener::bind(listen_address)
            .await
            .map_err(ServerError::Bind)?;
        let port = listener.local_addr().map_err(ServerError::Bind)?.port();

        let (shutdown_sender, shutdown_receiver) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_receiver.await.ok();
                })
                .await;
            if let Err(err) = served {
                tracing::error!("subgraph server terminated: {err}");
            }
        });

        Ok(SubgraphServer {
            shutdown: Some(shutdown_sender),
            port,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> String {
        format!("http://localhost:{}/", self.port)
    }
}
