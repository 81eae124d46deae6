// Streaming market-data client
//
// Owns the one persistent websocket connection for the process. Decodes
// inbound frames into snapshots and publishes them through the store; frames
// that fail to decode are logged and dropped so the UI keeps the last good
// data. Reconnects with capped exponential backoff and jitter, re-issuing the
// subscription each time; while disconnected the current snapshot is marked
// stale.

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::core::snapshot::decode_frame;
use crate::core::store::MarketDataStore;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct StreamingMarketDataClient {
    config: StreamConfig,
    store: Arc<MarketDataStore>,
    running: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StreamingMarketDataClient {
    pub fn new(config: StreamConfig, store: Arc<MarketDataStore>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            store,
            running: Arc::new(AtomicBool::new(false)),
            shutdown,
            task: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the connection task. Idempotent: calling while already running
    /// is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("stream client already running");
            return;
        }

        let config = self.config.clone();
        let store = Arc::clone(&self.store);
        let running = Arc::clone(&self.running);
        let mut shutdown = self.shutdown.subscribe();

        let handle = tokio::spawn(async move {
            run_loop(config, store, &mut shutdown).await;
            running.store(false, Ordering::SeqCst);
        });
        *self.task.lock().unwrap() = Some(handle);
    }

    /// Close the transport and release all subscriber registrations. Safe to
    /// call multiple times.
    pub async fn stop(&self) {
        let _ = self.shutdown.send(true);

        let handle = self.task.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        self.store.clear_subscribers();
        // Re-arm for a later start()
        let _ = self.shutdown.send(false);
    }
}

async fn run_loop(
    config: StreamConfig,
    store: Arc<MarketDataStore>,
    shutdown: &mut watch::Receiver<bool>,
) {
    let initial = Duration::from_secs(config.reconnect_initial_secs);
    let max = Duration::from_secs(config.reconnect_max_secs);
    let mut backoff = initial;

    loop {
        if *shutdown.borrow() {
            break;
        }

        match connect_async(&config.url).await {
            Ok((mut ws, _)) => {
                info!("📡 Connected to market stream at {}", config.url);
                backoff = initial;

                if let Err(e) = send_subscription(&mut ws, &config.pairs).await {
                    warn!("failed to send subscription: {}", e);
                } else {
                    read_frames(&mut ws, &store, shutdown).await;
                }

                if *shutdown.borrow() {
                    let _ = ws.close(None).await;
                    break;
                }
                store.mark_stale();
            }
            Err(e) => {
                warn!("market stream connect failed: {}", e);
                store.mark_stale();
            }
        }

        let wait = jittered(backoff);
        debug!("reconnecting in {:?}", wait);
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
        backoff = (backoff * 2).min(max);
    }
}

async fn send_subscription(
    ws: &mut WsStream,
    pairs: &[String],
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let subscribe = json!({
        "action": "subscribe",
        "pairs": pairs,
        "tradingBots": true,
    });
    ws.send(Message::Text(subscribe.to_string())).await
}

/// Read until the connection drops or shutdown is requested. Decoding and
/// fan-out happen on this single task tick; listeners must not block.
async fn read_frames(
    ws: &mut WsStream,
    store: &MarketDataStore,
    shutdown: &mut watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
            frame = ws.next() => {
                let Some(frame) = frame else {
                    warn!("market stream closed by peer");
                    return;
                };

                match frame {
                    Ok(Message::Text(text)) => {
                        match decode_frame(&text) {
                            Some(snapshot) => store.publish(snapshot),
                            None => debug!("dropped frame that did not match the ticker schema"),
                        }
                    }
                    Ok(Message::Ping(payload)) => {
                        if ws.send(Message::Pong(payload)).await.is_err() {
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("market stream closed by server");
                        return;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("market stream read error: {}", e);
                        return;
                    }
                }
            }
        }
    }
}

/// Backoff with ±20% jitter so reconnecting clients do not stampede.
fn jittered(backoff: Duration) -> Duration {
    let factor = rand::thread_rng().gen_range(0.8..1.2);
    Duration::from_secs_f64(backoff.as_secs_f64() * factor)
}
