//! Realtime change feed over websocket
//!
//! 1. Connect to the realtime endpoint
//! 2. Join one channel listening to every `postgres_changes` event of the public schema
//! 3. Forward the join reply as `Subscribed` / `ChannelError`
//! 4. Forward every row change as a [`ChangeEvent`]
//! 5. Heartbeat until the consumer drops the feed or the socket ends
//!
//! Reconnecting is the consumer's job: the feed ends (channel closes) after
//! reporting a terminal status.

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use shared::Collection;
use tokio::time::{Duration, interval, sleep};
use tokio_tungstenite::tungstenite::Message;

use crate::config::GatewayConfig;
use crate::error::GatewayResult;
use crate::feed::{ChangeEvent, ChangeFeed, ChangeKind, ChannelStatus, FeedMessage, FeedSender};

/// Heartbeat interval expected by the realtime server
const HEARTBEAT_INTERVAL_SECS: u64 = 25;
/// Give up on a join that never gets a reply
const JOIN_TIMEOUT_SECS: u64 = 10;
/// Ref used for the join message
const JOIN_REF: &str = "1";

/// Open a change feed; connection happens in the background
pub fn subscribe(config: &GatewayConfig) -> GatewayResult<ChangeFeed> {
    let url = config.realtime_url()?;
    let topic = format!("realtime:{}", config.channel);
    let (tx, feed) = ChangeFeed::channel();

    tokio::spawn(run_session(url, topic, tx));
    Ok(feed)
}

/// Decoded server frame
#[derive(Debug, PartialEq)]
enum Frame {
    Joined,
    JoinRejected(String),
    Change(ChangeEvent),
    ChannelError,
    Closed,
    Ignore,
}

#[derive(Debug, Deserialize)]
struct PhoenixMessage {
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "ref", default)]
    msg_ref: Option<String>,
}

fn join_message(topic: &str) -> String {
    json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [{ "event": "*", "schema": "public" }]
            }
        },
        "ref": JOIN_REF,
        "join_ref": JOIN_REF,
    })
    .to_string()
}

fn heartbeat_message(msg_ref: u64) -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref.to_string(),
    })
    .to_string()
}

fn decode_frame(text: &str) -> Frame {
    let msg: PhoenixMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("Unparseable realtime frame: {e}");
            return Frame::Ignore;
        }
    };

    match msg.event.as_str() {
        "phx_reply" if msg.msg_ref.as_deref() == Some(JOIN_REF) => {
            if msg.payload["status"] == "ok" {
                Frame::Joined
            } else {
                let reason = msg.payload["response"]["reason"]
                    .as_str()
                    .unwrap_or("join rejected")
                    .to_string();
                Frame::JoinRejected(reason)
            }
        }
        "postgres_changes" => {
            let data = &msg.payload["data"];
            let kind = data["type"].as_str().and_then(ChangeKind::from_wire);
            let collection = data["table"].as_str().and_then(Collection::from_table);
            match (collection, kind) {
                (Some(collection), Some(kind)) => Frame::Change(ChangeEvent { collection, kind }),
                _ => {
                    tracing::debug!(table = ?data["table"], "Change on untracked table");
                    Frame::Ignore
                }
            }
        }
        "phx_error" => Frame::ChannelError,
        "phx_close" => Frame::Closed,
        _ => Frame::Ignore,
    }
}

async fn run_session(url: String, topic: String, tx: FeedSender) {
    tx.status(ChannelStatus::Connecting);

    let ws = tokio::select! {
        _ = tx.closed() => return,
        result = tokio_tungstenite::connect_async(url.as_str()) => match result {
            Ok((ws, _)) => ws,
            Err(e) => {
                tracing::warn!("Realtime connection failed: {e}");
                tx.status(ChannelStatus::ChannelError);
                return;
            }
        }
    };
    let (mut sink, mut stream) = ws.split();

    if let Err(e) = sink.send(Message::Text(join_message(&topic).into())).await {
        tracing::warn!("Realtime join failed: {e}");
        tx.status(ChannelStatus::ChannelError);
        return;
    }

    let mut heartbeat = interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    heartbeat.tick().await; // skip immediate tick
    let mut next_ref: u64 = 2;

    let join_timeout = sleep(Duration::from_secs(JOIN_TIMEOUT_SECS));
    tokio::pin!(join_timeout);
    let mut joined = false;

    loop {
        tokio::select! {
            _ = tx.closed() => {
                tracing::debug!(topic = %topic, "Realtime feed dropped, closing socket");
                let _ = sink.close().await;
                return;
            }

            _ = &mut join_timeout, if !joined => {
                tracing::warn!(topic = %topic, "Realtime join timed out");
                tx.status(ChannelStatus::TimedOut);
                let _ = sink.close().await;
                return;
            }

            _ = heartbeat.tick() => {
                if sink.send(Message::Text(heartbeat_message(next_ref).into())).await.is_err() {
                    tracing::warn!("Realtime heartbeat failed, disconnecting");
                    tx.status(ChannelStatus::Closed);
                    return;
                }
                next_ref += 1;
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match decode_frame(&text) {
                        Frame::Joined => {
                            joined = true;
                            tracing::info!(topic = %topic, "Realtime channel subscribed");
                            tx.status(ChannelStatus::Subscribed);
                        }
                        Frame::JoinRejected(reason) => {
                            tracing::warn!(topic = %topic, "Realtime join rejected: {reason}");
                            tx.status(ChannelStatus::ChannelError);
                            let _ = sink.close().await;
                            return;
                        }
                        Frame::Change(event) => {
                            tracing::trace!(table = %event.collection, kind = ?event.kind, "Realtime change");
                            if !tx.send(FeedMessage::Change(event)) {
                                let _ = sink.close().await;
                                return;
                            }
                        }
                        Frame::ChannelError => {
                            tx.status(ChannelStatus::ChannelError);
                            return;
                        }
                        Frame::Closed => {
                            tx.status(ChannelStatus::Closed);
                            return;
                        }
                        Frame::Ignore => {}
                    },
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(topic = %topic, "Realtime socket closed");
                        tx.status(ChannelStatus::Closed);
                        return;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Realtime socket error: {e}");
                        tx.status(ChannelStatus::ChannelError);
                        return;
                    }
                    _ => {} // Binary, Pong, Frame: ignored
                }
            }
        }
    }
}
