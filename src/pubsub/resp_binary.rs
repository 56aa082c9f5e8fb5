//! RESP-binary pub/sub backend (spec §4.G mode 2): messages are delivered
//! one at a time through an async `next_message` call instead of
//! synchronous callbacks, for callers that would rather poll than register
//! listeners, and that need payload bytes with no UTF-8 detour (contrast
//! [`native`](super::native), which must base64-sentinel non-UTF-8
//! payloads to fit its `String` callback signature).

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot};

use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::pubsub::SubscriptionState;

/// One message as raw bytes, exactly as the server sent them.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub channel: Vec<u8>,
    pub payload: Vec<u8>,
    pub pattern: Option<Vec<u8>>,
}

/// Subscriber connection for RESP-binary mode. Exposes received messages
/// through [`RawSubscriber::next_message`] rather than callbacks.
pub struct RawSubscriber {
    state: Arc<SubscriptionState>,
    sink: redis::aio::PubSub,
}

impl RawSubscriber {
    pub async fn connect(options: &ClientOptions) -> Result<Self> {
        let client = redis::Client::open(options.to_url()).map_err(Error::from)?;
        let sink = client.get_async_pubsub().await.map_err(Error::from)?;
        Ok(Self { state: Arc::new(SubscriptionState::new()), sink })
    }

    pub async fn subscribe(&mut self, channel: &[u8]) -> Result<()> {
        self.sink.subscribe(channel).await.map_err(Error::from)?;
        self.state.add_channel(String::from_utf8_lossy(channel).into_owned());
        Ok(())
    }

    pub async fn psubscribe(&mut self, pattern: &[u8]) -> Result<()> {
        self.sink.psubscribe(pattern).await.map_err(Error::from)?;
        self.state.add_pattern(String::from_utf8_lossy(pattern).into_owned());
        Ok(())
    }

    pub async fn unsubscribe(&mut self, channel: &[u8]) -> Result<()> {
        self.sink.unsubscribe(channel).await.map_err(Error::from)?;
        self.state.remove_channel(&String::from_utf8_lossy(channel));
        Ok(())
    }

    pub async fn punsubscribe(&mut self, pattern: &[u8]) -> Result<()> {
        self.sink.punsubscribe(pattern).await.map_err(Error::from)?;
        self.state.remove_pattern(&String::from_utf8_lossy(pattern));
        Ok(())
    }

    pub fn subscription_state(&self) -> Arc<SubscriptionState> {
        self.state.clone()
    }

    /// Await the next message. Pollable in a loop the way a caller would
    /// drain any other async stream; returns `None` once the connection
    /// closes.
    pub async fn next_message(&mut self) -> Option<RawMessage> {
        let msg = self.sink.on_message().next().await?;
        let channel = msg.get_channel_name().as_bytes().to_vec();
        let payload = msg.get_payload::<Vec<u8>>().unwrap_or_default();
        let pattern = msg.get_pattern::<Vec<u8>>().ok();
        Some(RawMessage { channel, payload, pattern })
    }

    /// Drive message delivery, forwarding each [`RawMessage`] over
    /// `messages`, while also accepting subscription-change requests over
    /// `commands` — the RESP-binary counterpart to
    /// [`NativeSubscriber::run_with_commands`](super::native::NativeSubscriber::run_with_commands).
    pub async fn run_with_commands(
        mut self,
        messages: mpsc::UnboundedSender<RawMessage>,
        mut commands: mpsc::UnboundedReceiver<(SubscriberCommand, oneshot::Sender<Result<usize>>)>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                maybe_msg = self.sink.on_message().next() => {
                    let Some(msg) = maybe_msg else { break };
                    let channel = msg.get_channel_name().as_bytes().to_vec();
                    let payload = msg.get_payload::<Vec<u8>>().unwrap_or_default();
                    let pattern = msg.get_pattern::<Vec<u8>>().ok();
                    if messages.send(RawMessage { channel, payload, pattern }).is_err() {
                        break;
                    }
                }
                Some((cmd, reply)) = commands.recv() => {
                    let result = self.apply_command(cmd).await;
                    let _ = reply.send(result);
                }
            }
        }
        Ok(())
    }

    async fn apply_command(&mut self, cmd: SubscriberCommand) -> Result<usize> {
        match cmd {
            SubscriberCommand::Subscribe(channel) => {
                self.subscribe(channel.as_bytes()).await?;
                Ok(self.state.channel_count())
            }
            SubscriberCommand::PSubscribe(pattern) => {
                self.psubscribe(pattern.as_bytes()).await?;
                Ok(self.state.pattern_count())
            }
            SubscriberCommand::Unsubscribe(channel) => {
                self.unsubscribe(channel.as_bytes()).await?;
                Ok(self.state.channel_count())
            }
            SubscriberCommand::PUnsubscribe(pattern) => {
                self.punsubscribe(pattern.as_bytes()).await?;
                Ok(self.state.pattern_count())
            }
            SubscriberCommand::SSubscribe(_) | SubscriberCommand::SUnsubscribe(_) => {
                Err(Error::Argument("sharded pub/sub is not supported in RESP-binary mode".into()))
            }
        }
    }
}

/// A subscription-mutating request sent to [`RawSubscriber::run_with_commands`].
/// Re-exported under the same shape as [`super::native::SubscriberCommand`]
/// so [`Client`](crate::client::Client) can route through either backend
/// with one command enum.
pub use super::native::SubscriberCommand;
