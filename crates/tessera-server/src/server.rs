use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::routes::router;
use crate::state::AppState;

/// Serve on `listener` until `shutdown` is cancelled. In-flight requests are
/// allowed to finish.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> std::io::Result<()> {
  let addr = listener.local_addr()?;
  info!(%addr, "tessera server listening");

  axum::serve(listener, router(state))
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await?;

  info!("tessera server stopped");
  Ok(())
}
