// src/server/mod.rs

//! Dev server and the serve state.
//!
//! [`serve`] is the terminal state of the default plan: it serves the output
//! root, watches inputs, re-runs affected tasks and pushes reload events to
//! connected browsers until Ctrl-C.

pub mod inject;
pub mod live_reload;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::RealExecutorBackend;
use crate::tasks::BuildContext;
use crate::types::Reload;
use crate::watch::{build_profiles, spawn_watcher};

pub use live_reload::LiveReloadServer;

const HUB_CAPACITY: usize = 64;
const RUNTIME_CHANNEL: usize = 256;

/// Something that can tell browsers to refresh.
pub trait Notifier: Send + Sync {
    fn notify(&self, reload: Reload);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubMessage {
    Reload(Reload),
    /// Server is shutting down; streams end.
    Closed,
}

/// Fan-out of reload events to every connected SSE client.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<HubMessage>,
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(HUB_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HubMessage> {
        self.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn close(&self) {
        let _ = self.tx.send(HubMessage::Closed);
    }
}

impl Notifier for ReloadHub {
    fn notify(&self, reload: Reload) {
        // No connected clients is not an error.
        match self.tx.send(HubMessage::Reload(reload)) {
            Ok(clients) => debug!(event = reload.event_name(), clients, "reload pushed"),
            Err(_) => debug!(event = reload.event_name(), "no live-reload clients"),
        }
    }
}

/// Serve the output root and rebuild on change until Ctrl-C.
pub async fn serve(ctx: BuildContext) -> anyhow::Result<()> {
    serve_until(ctx, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            return std::future::pending().await;
        }
        info!("Ctrl-C received; shutting down");
    })
    .await
}

/// Serve the output root and rebuild on change until `shutdown` resolves.
pub async fn serve_until<F>(ctx: BuildContext, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let config = ctx.config();
    let hub = ReloadHub::new();
    let server = LiveReloadServer::start(config.server(), ctx.output_root(), hub.clone()).await?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(RUNTIME_CHANNEL);

    let profiles = build_profiles(config)?;
    let _watcher = spawn_watcher(
        ctx.root(),
        config.output_root(),
        profiles,
        config.watch().settle,
        Arc::clone(ctx.fs_arc()),
        rt_tx.clone(),
    )?;

    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            shutdown.await;
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let executor = RealExecutorBackend::new(ctx.clone(), rt_tx);
    let core = CoreRuntime::new(RuntimeOptions::default());
    let notifier: Arc<dyn Notifier> = Arc::new(hub);
    Runtime::new(core, rt_rx, executor, notifier).run().await?;

    server.stop().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hub_fans_out_to_every_subscriber() {
        let hub = ReloadHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.client_count(), 2);

        hub.notify(Reload::Styles);
        assert_eq!(a.recv().await.unwrap(), HubMessage::Reload(Reload::Styles));
        assert_eq!(b.recv().await.unwrap(), HubMessage::Reload(Reload::Styles));

        hub.close();
        assert_eq!(a.recv().await.unwrap(), HubMessage::Closed);
    }

    #[test]
    fn notifying_without_clients_is_fine() {
        ReloadHub::new().notify(Reload::Page);
    }
}
