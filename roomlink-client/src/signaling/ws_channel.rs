use crate::config::ClientConfig;
use crate::error::SignalingError;
use crate::signaling::inbound_channel::{ChannelEvent, InboundChannel};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Code reported when the socket fails without a close frame.
const TRANSPORT_ERROR_CODE: i32 = -1;

const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// [`InboundChannel`] over a WebSocket to the channel page URL.
pub struct WebSocketChannel {
    connect_timeout: Duration,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl WebSocketChannel {
    /// `connect_timeout` bounds the TCP connect and the upgrade handshake together.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout,
            stop_tx: Mutex::new(None),
            reader: Mutex::new(None),
        }
    }
}

#[async_trait]
impl InboundChannel for WebSocketChannel {
    async fn open(
        &self,
        url: &str,
        events: mpsc::Sender<ChannelEvent>,
    ) -> Result<(), SignalingError> {
        let ws_url = to_ws_url(url)?;
        let (stop_tx, stop_rx) = oneshot::channel();

        let reader = tokio::spawn(run_channel(ws_url, self.connect_timeout, events, stop_rx));

        if let Some(previous) = self.stop_tx.lock().await.replace(stop_tx) {
            let _ = previous.send(());
        }
        *self.reader.lock().await = Some(reader);
        Ok(())
    }

    async fn close(&self) {
        let Some(stop_tx) = self.stop_tx.lock().await.take() else {
            return;
        };
        let _ = stop_tx.send(());

        // Give the reader a moment to send the close frame.
        if let Some(reader) = self.reader.lock().await.take() {
            let _ = tokio::time::timeout(CLOSE_GRACE, reader).await;
        }
        debug!("WebSocket channel closed");
    }
}

async fn run_channel(
    ws_url: Url,
    connect_timeout: Duration,
    events: mpsc::Sender<ChannelEvent>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let connecting = tokio::time::timeout(connect_timeout, connect_async(ws_url.as_str()));
    let failure = match connecting.await {
        Ok(Ok((stream, _response))) => {
            read_channel(stream, &ws_url, &events, &mut stop_rx).await;
            return;
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("no handshake from {ws_url} within {connect_timeout:?}"),
    };

    warn!("Signaling channel connect failed: {}", failure);
    let _ = events
        .send(ChannelEvent::Error {
            code: TRANSPORT_ERROR_CODE,
            description: failure,
        })
        .await;
}

async fn read_channel(
    stream: WsStream,
    ws_url: &Url,
    events: &mpsc::Sender<ChannelEvent>,
    stop_rx: &mut oneshot::Receiver<()>,
) {
    info!("Signaling channel connected: {}", ws_url);
    if events.send(ChannelEvent::Opened).await.is_err() {
        return;
    }

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            _ = &mut *stop_rx => {
                let _ = write.send(Message::Close(None)).await;
                break;
            }

            frame = read.next() => {
                let event = match frame {
                    Some(Ok(Message::Text(text))) => ChannelEvent::Message(text.as_str().to_owned()),
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(frame) = frame {
                            info!("Channel closed by peer: {} {}", u16::from(frame.code), frame.reason.as_str());
                        }
                        let _ = events.send(ChannelEvent::Closed).await;
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("Signaling channel failed: {}", e);
                        let _ = events
                            .send(ChannelEvent::Error {
                                code: TRANSPORT_ERROR_CODE,
                                description: e.to_string(),
                            })
                            .await;
                        break;
                    }
                    None => {
                        let _ = events.send(ChannelEvent::Closed).await;
                        break;
                    }
                };

                if events.send(event).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Maps the channel page URL onto the matching WebSocket scheme.
fn to_ws_url(url: &str) -> Result<Url, SignalingError> {
    let mut parsed =
        Url::parse(url).map_err(|e| SignalingError::Channel(format!("bad channel URL {url}: {e}")))?;

    let scheme = match parsed.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(SignalingError::Channel(format!(
                "unsupported channel scheme {other}"
            )));
        }
    };

    parsed
        .set_scheme(scheme)
        .map_err(|()| SignalingError::Channel(format!("cannot switch {url} to {scheme}")))?;
    Ok(parsed)
}
