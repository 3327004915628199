use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use notify::RecommendedWatcher;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

use crate::files::watcher;
use crate::http::connection::Connection;
use crate::server::context::ServerContext;

/// A bound listener plus everything its connections share.
pub struct Server {
    listener: TcpListener,
    context: Arc<ServerContext>,
    // Dropping it stops the watch.
    _watcher: Option<RecommendedWatcher>,
}

impl Server {
    /// Binds the configured address and starts the static file watcher.
    ///
    /// A bind failure is returned to the caller. A watcher that cannot start
    /// only costs cache invalidation, so it is logged and skipped.
    pub async fn bind(context: Arc<ServerContext>) -> anyhow::Result<Self> {
        let addr = context.config.server.listen_addr.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Listening on {}", listener.local_addr()?);

        let statics = &context.config.static_files;
        let watcher = if statics.watch {
            match watcher::watch(Arc::clone(&context.files), statics.recursive) {
                Ok(w) => Some(w),
                Err(err) => {
                    warn!(
                        root = %context.files.root().display(),
                        error = %err,
                        "Static file watcher not started"
                    );
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            listener,
            context,
            _watcher: watcher,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn context(&self) -> &Arc<ServerContext> {
        &self.context
    }

    /// Accepts connections until `shutdown` resolves, then stops every worker.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> anyhow::Result<()> {
        let server_cfg = &self.context.config.server;
        let cleanup_interval = server_cfg.cleanup_interval.max(1);
        let shutdown_timeout = server_cfg.shutdown_timeout();

        let (stop_tx, _) = broadcast::channel::<()>(1);
        let mut workers: Vec<JoinHandle<()>> = Vec::new();
        let mut accepted: usize = 0;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,

                res = self.listener.accept() => {
                    let (socket, peer) = match res {
                        Ok(conn) => conn,
                        Err(err) => {
                            warn!(error = %err, "Accept failed");
                            continue;
                        }
                    };
                    debug!("Accepted connection from {}", peer);

                    let context = Arc::clone(&self.context);
                    let stop = stop_tx.subscribe();
                    workers.push(tokio::spawn(async move {
                        let mut conn = Connection::new(socket, peer, context, stop);
                        if let Err(e) = conn.run().await {
                            debug!("Connection error from {}: {}", peer, e);
                        }
                    }));

                    accepted += 1;
                    if accepted % cleanup_interval == 0 {
                        let before = workers.len();
                        workers.retain(|w| !w.is_finished());
                        debug!(
                            swept = before - workers.len(),
                            live = workers.len(),
                            "Swept finished connection workers"
                        );
                    }
                }
            }
        }

        info!(workers = workers.len(), "Shutting down");
        drop(self.listener);
        let _ = stop_tx.send(());
        stop_workers(workers, shutdown_timeout).await;
        Ok(())
    }
}

/// Waits for workers until `limit` has passed, then aborts the rest.
async fn stop_workers(workers: Vec<JoinHandle<()>>, limit: Duration) {
    let deadline = Instant::now() + limit;
    let mut aborted = 0usize;

    for mut worker in workers {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if timeout(remaining, &mut worker).await.is_err() {
            worker.abort();
            aborted += 1;
        }
    }

    if aborted > 0 {
        warn!(aborted, "Aborted connection workers that did not stop in time");
    }
}
