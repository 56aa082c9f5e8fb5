//! The adapter's main handle. A [`Client`] is cheap to clone (spec §5: the
//! "multi-threaded parallel" concurrency model) — every clone shares the
//! same underlying driver handle, connection state, event emitter, and
//! script registry through an `Arc`.

use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;

use crate::config::{ClientOptions, IntoConfig};
use crate::driver::redis_driver::RedisDriver;
use crate::driver::{ClusterRoutingHint, Driver, RawCommand};
use crate::error::{Error, Result};
use crate::events::Emitter;
use crate::pipeline::Pipeline;
use crate::pubsub::native::{NativeSubscriber, SubscriberCommand};
use crate::pubsub::resp_binary::RawSubscriber;
use crate::pubsub::PubSubEvent;
use crate::scripting::{ScriptCommand, ScriptRegistry};
use crate::state::{ConnectionEvent, ConnectionState, ConnectionStatus};
use crate::transaction::Transaction;
use crate::translate;
use crate::value::Value;

/// Owns whichever pub/sub backend is active and the task driving it. A
/// client starts with no subscriber connection at all — one is opened lazily
/// on the first `subscribe`/`psubscribe`/`ssubscribe` call, matching
/// ioredis's behavior of only paying for a second connection once pub/sub is
/// actually used.
#[derive(Default)]
struct PubSubManager {
    task: Option<tokio::task::JoinHandle<()>>,
    commands: Option<tokio::sync::mpsc::UnboundedSender<(SubscriberCommand, tokio::sync::oneshot::Sender<Result<usize>>)>>,
}

impl Drop for PubSubManager {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct ClientInner {
    options: ClientOptions,
    driver: AsyncMutex<Option<Arc<dyn Driver>>>,
    state: ConnectionState,
    events: Emitter<ConnectionEvent>,
    scripts: ScriptRegistry,
    pubsub: AsyncMutex<PubSubManager>,
    pubsub_events: Emitter<PubSubEvent>,
    /// Set by [`ClusterClient`](crate::cluster::ClusterClient) after
    /// construction. Drives the `isCluster` property (spec §6) and the
    /// cluster-vs-standalone pipeline/transaction/unwatch polymorphism
    /// (spec §4.I).
    is_cluster: std::sync::atomic::AtomicBool,
}

/// An ioredis-shaped connection handle. See the crate root for a basic
/// usage example.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Build a client and, unless `lazy_connect` is set, schedule its
    /// initial connect to begin right after this call returns rather than
    /// before (spec §4.C). Accepts anything implementing [`IntoConfig`]:
    /// a [`ClientOptions`] value, a `redis://` URL, or a `(host, port)` tuple.
    pub async fn connect(config: impl IntoConfig) -> Result<Self> {
        let options = config.into_config()?;
        let lazy = options.lazy_connect;
        let client = Self {
            inner: Arc::new(ClientInner {
                state: ConnectionState::new(lazy),
                driver: AsyncMutex::new(None),
                events: Emitter::new(),
                scripts: ScriptRegistry::new(),
                pubsub: AsyncMutex::new(PubSubManager::default()),
                pubsub_events: Emitter::new(),
                is_cluster: std::sync::atomic::AtomicBool::new(false),
                options,
            }),
        };
        if !lazy {
            // Schedule the initial connect for after this function returns
            // instead of awaiting `dial()` inline: per spec §4.C ("construction
            // schedules a connect on the next iteration of the event queue,
            // not synchronously, so that listeners attached immediately after
            // construction see the events") and Design Notes §9, a caller
            // doing `let client = Client::connect(opts).await?;
            // client.on("ready", ...)` must still be able to observe the
            // initial connection's events — which an inline `.await?` here
            // would already have fired before the caller got `client` back.
            // `dial()` itself serializes against whichever caller reaches it
            // first (see its doc comment), so a command issued before this
            // background attempt finishes just waits its turn rather than
            // racing a second connection.
            let background = client.clone();
            tokio::spawn(async move {
                let _ = background.dial().await;
            });
        }
        Ok(client)
    }

    /// Construct a client around an already-built driver, skipping network
    /// dial entirely. Used by tests to run the command surface against
    /// [`MockDriver`](crate::driver::mock::MockDriver).
    pub fn with_driver(options: ClientOptions, driver: Arc<dyn Driver>) -> Self {
        let state = ConnectionState::new(false);
        state.transition(ConnectionStatus::Connect);
        state.transition(ConnectionStatus::Ready);
        Self {
            inner: Arc::new(ClientInner {
                options,
                driver: AsyncMutex::new(Some(driver)),
                state,
                events: Emitter::new(),
                scripts: ScriptRegistry::new(),
                pubsub: AsyncMutex::new(PubSubManager::default()),
                pubsub_events: Emitter::new(),
                is_cluster: std::sync::atomic::AtomicBool::new(false),
            }),
        }
    }

    /// Establish the driver connection, or return the one already
    /// established. Holds the driver lock across the whole attempt
    /// (including the network round trip and ready check) rather than just
    /// checking-then-dropping it, so a background initial connect racing a
    /// caller's first command can't both dial at once: whichever gets here
    /// first does the real work, the other finds `Some` once it gets the
    /// lock and returns that.
    async fn dial(&self) -> Result<Arc<dyn Driver>> {
        let mut guard = self.inner.driver.lock().await;
        if let Some(driver) = guard.clone() {
            return Ok(driver);
        }
        self.fire(self.inner.state.transition(ConnectionStatus::Connecting));
        let driver: Arc<dyn Driver> = Arc::new(RedisDriver::connect_standalone(&self.inner.options.to_url()).await?);
        self.fire(self.inner.state.transition(ConnectionStatus::Connect));
        *guard = Some(driver.clone());
        drop(guard);
        if self.inner.options.enable_ready_check {
            driver.custom_command(vec![b"PING".to_vec()]).await?;
        }
        self.fire(self.inner.state.transition(ConnectionStatus::Ready));
        Ok(driver)
    }

    fn fire(&self, event: Option<ConnectionEvent>) {
        if let Some(event) = event {
            self.inner.events.emit(&event);
        }
    }

    /// Dial lazily if this client was built with `lazy_connect`, otherwise
    /// return the already-established driver handle.
    pub(crate) async fn ensure_connected(&self) -> Result<Arc<dyn Driver>> {
        if let Some(driver) = self.inner.driver.lock().await.clone() {
            return Ok(driver);
        }
        self.dial().await
    }

    /// Current value of `client.status` (spec §4.C).
    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.status()
    }

    /// Register a listener for a connection lifecycle event
    /// (`"connect"`/`"ready"`/`"close"`/`"reconnecting"`/`"end"`).
    pub fn on(&self, event: &'static str, listener: impl Fn(&ConnectionEvent) + Send + Sync + 'static) {
        self.inner.events.on(event, listener);
    }

    /// BullMQ-style direct assignment to `.status` (spec §9 quirk
    /// preservation). Pass `None` to clear the override and resume
    /// observing the real state machine.
    pub fn set_status_override(&self, status: Option<ConnectionStatus>) {
        self.inner.state.set_status_override(status);
    }

    /// Resolve once the client reaches [`ConnectionStatus::Ready`]. Already
    /// ready clients return immediately.
    pub async fn wait_until_ready(&self) -> Result<()> {
        if self.inner.state.is_ready() {
            return Ok(());
        }
        self.ensure_connected().await?;
        Ok(())
    }

    /// Tear down the underlying connection without allowing reconnects —
    /// `client.status` becomes `"end"` (ioredis's `disconnect()`).
    pub async fn disconnect(&self) -> Result<()> {
        {
            let mut guard = self.inner.pubsub.lock().await;
            if let Some(task) = guard.task.take() {
                task.abort();
            }
            guard.commands = None;
        }
        if let Some(driver) = self.inner.driver.lock().await.take() {
            driver.close().await?;
        }
        self.fire(self.inner.state.transition(ConnectionStatus::Close));
        self.fire(self.inner.state.transition(ConnectionStatus::End));
        Ok(())
    }

    /// Graceful variant of [`Client::disconnect`] (ioredis's `quit()`):
    /// identical behavior here since there are no in-flight commands to
    /// drain once the driver layer owns buffering.
    pub async fn quit(&self) -> Result<()> {
        self.disconnect().await
    }

    /// Alias for [`Client::disconnect`] (ioredis also exposes `close()` on
    /// newer versions as the non-deprecated spelling).
    pub async fn close(&self) -> Result<()> {
        self.disconnect().await
    }

    /// Clone this client's configuration into an independent connection
    /// (ioredis's `duplicate()`). Per spec §9, constructor side effects
    /// (ready checks, eager connect) are not re-run implicitly — the
    /// returned client honors `lazy_connect` exactly like a fresh `connect`.
    pub fn duplicate(&self) -> Client {
        let options = self.inner.options.clone();
        Client {
            inner: Arc::new(ClientInner {
                state: ConnectionState::new(options.lazy_connect),
                driver: AsyncMutex::new(None),
                events: Emitter::new(),
                scripts: ScriptRegistry::new(),
                pubsub: AsyncMutex::new(PubSubManager::default()),
                pubsub_events: Emitter::new(),
                is_cluster: std::sync::atomic::AtomicBool::new(self.is_cluster()),
                options,
            }),
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// `isCluster` (spec §6): true for clients built through
    /// [`ClusterClient`](crate::cluster::ClusterClient), false for a plain
    /// standalone [`Client`].
    pub fn is_cluster(&self) -> bool {
        self.inner.is_cluster.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Flip the `isCluster` flag. `pub(crate)` — only
    /// [`ClusterClient::connect`](crate::cluster::ClusterClient::connect)
    /// should ever call this, right after building the underlying `Client`.
    pub(crate) fn mark_cluster(&self) {
        self.inner.is_cluster.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    /// Apply the configured key prefix to a caller-supplied key.
    pub fn prefixed_key(&self, key: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        translate::normalize_key(key, self.inner.options.key_prefix.as_deref())
    }

    /// Low-level escape hatch (ioredis's `call`): issue any command by name
    /// and already-encoded arguments. Uppercases the command name the way
    /// ioredis's `call` does (spec §4.D) — see [`Client::send_command`] for
    /// the sibling that forwards the command name exactly as given.
    pub async fn call(&self, mut args: RawCommand) -> Result<Value> {
        if args.is_empty() {
            return Err(Error::Argument("call() requires at least a command name".into()));
        }
        args[0] = args[0].to_ascii_uppercase();
        let driver = self.ensure_connected().await?;
        driver.custom_command(args).await
    }

    /// `sendCommand` (spec §4.D, §6): forwards a pre-built command to the
    /// driver's raw escape hatch exactly as given, without `call`'s
    /// uppercasing — for callers (command objects/arrays) that already
    /// know the exact casing the server expects.
    pub async fn send_command(&self, args: RawCommand) -> Result<Value> {
        if args.is_empty() {
            return Err(Error::Argument("send_command() requires at least a command name".into()));
        }
        let driver = self.ensure_connected().await?;
        driver.custom_command(args).await
    }

    pub fn create_pipeline(&self) -> Pipeline {
        Pipeline::new(self.clone())
    }

    pub fn create_transaction(&self) -> Transaction {
        Transaction::new(self.clone())
    }

    /// Register a Lua script the way ioredis's `defineCommand` does,
    /// returning a handle to invoke in place of the dynamic method Rust
    /// cannot install at runtime (spec §9 Open Question).
    pub fn define_command(&self, name: impl Into<String>, num_keys: u32, lua: impl Into<String>) -> ScriptCommand {
        self.inner.scripts.define(name.into(), num_keys, lua.into())
    }

    /// Invoke a script registered via [`Client::define_command`], trying
    /// `EVALSHA` first and falling back to `EVAL` on `NOSCRIPT` (spec §4.F).
    pub async fn call_script(&self, handle: &ScriptCommand, keys: &[Vec<u8>], args: &[Vec<u8>]) -> Result<Value> {
        let driver = self.ensure_connected().await?;
        crate::scripting::invoke(driver.as_ref(), handle, keys, args, self.inner.options.key_prefix.as_deref()).await
    }

    /// Start an optimistic-lock watch on `keys` outside of a
    /// [`Transaction`] (ioredis's standalone `client.watch(...keys)`).
    /// Most callers reach for [`Client::create_transaction`] and its own
    /// `.watch()` builder method instead; this exists for parity with the
    /// external interface named in spec §6.
    pub async fn watch(&self, keys: &[Vec<u8>]) -> Result<()> {
        let driver = self.ensure_connected().await?;
        driver.watch(keys).await
    }

    /// Clear any watches established outside of a transaction builder.
    pub async fn unwatch(&self) -> Result<()> {
        let driver = self.ensure_connected().await?;
        driver.unwatch(ClusterRoutingHint::None).await
    }

    /// `PUBLISH`: send `message` to `channel`, returning the number of
    /// subscribers that received it.
    pub async fn publish(&self, channel: impl AsRef<[u8]>, message: impl AsRef<[u8]>) -> Result<i64> {
        let reply = self.call(vec![b"PUBLISH".to_vec(), channel.as_ref().to_vec(), message.as_ref().to_vec()]).await?;
        crate::value::from_value(reply)
    }

    /// Register a listener for one of the pub/sub event shapes
    /// (`"message"`, `"messageBuffer"`, `"pmessage"`, `"pmessageBuffer"`,
    /// `"subscribe"`, `"unsubscribe"`, `"psubscribe"`, `"punsubscribe"`,
    /// `"ssubscribe"`, `"sunsubscribe"`), matching ioredis's
    /// `client.on(event, listener)` (spec §4.G, §6).
    pub fn on_pubsub(&self, event: &'static str, listener: impl Fn(&PubSubEvent) + Send + Sync + 'static) {
        self.inner.pubsub_events.on(event, listener);
    }

    fn emit_pubsub(&self, event: PubSubEvent) {
        self.inner.pubsub_events.emit(&event);
    }

    /// `SUBSCRIBE`: begin receiving `message`/`messageBuffer` events for
    /// `channel`. Opens the subscriber connection on first use (spec §4.G).
    pub async fn subscribe(&self, channel: impl Into<String>) -> Result<()> {
        let channel = channel.into();
        let count = self.send_subscriber_command(SubscriberCommand::Subscribe(channel.clone())).await?;
        self.emit_pubsub(PubSubEvent::Subscribe { channel, count });
        Ok(())
    }

    /// `PSUBSCRIBE`: begin receiving `pmessage`/`pmessageBuffer` events for
    /// channels matching `pattern`.
    pub async fn psubscribe(&self, pattern: impl Into<String>) -> Result<()> {
        let pattern = pattern.into();
        let count = self.send_subscriber_command(SubscriberCommand::PSubscribe(pattern.clone())).await?;
        self.emit_pubsub(PubSubEvent::PSubscribe { pattern, count });
        Ok(())
    }

    /// `UNSUBSCRIBE`.
    pub async fn unsubscribe(&self, channel: impl Into<String>) -> Result<()> {
        let channel = channel.into();
        let count = self.send_subscriber_command(SubscriberCommand::Unsubscribe(channel.clone())).await?;
        self.emit_pubsub(PubSubEvent::Unsubscribe { channel, count });
        Ok(())
    }

    /// `PUNSUBSCRIBE`.
    pub async fn punsubscribe(&self, pattern: impl Into<String>) -> Result<()> {
        let pattern = pattern.into();
        let count = self.send_subscriber_command(SubscriberCommand::PUnsubscribe(pattern.clone())).await?;
        self.emit_pubsub(PubSubEvent::PUnsubscribe { pattern, count });
        Ok(())
    }

    /// `SSUBSCRIBE`: cluster-only sharded subscribe (spec §4.I). Exposed
    /// here as `pub(crate)` — [`ClusterClient`](crate::cluster::ClusterClient)
    /// is the type that actually surfaces it publicly, since sharded pub/sub
    /// has no meaning on a standalone connection.
    pub(crate) async fn ssubscribe_impl(&self, channel: impl Into<String>) -> Result<()> {
        let channel = channel.into();
        let count = self.send_subscriber_command(SubscriberCommand::SSubscribe(channel.clone())).await?;
        self.emit_pubsub(PubSubEvent::SSubscribe { channel, count });
        Ok(())
    }

    pub(crate) async fn sunsubscribe_impl(&self, channel: impl Into<String>) -> Result<()> {
        let channel = channel.into();
        let count = self.send_subscriber_command(SubscriberCommand::SUnsubscribe(channel.clone())).await?;
        self.emit_pubsub(PubSubEvent::SUnsubscribe { channel, count });
        Ok(())
    }

    /// Open the subscriber connection (if one isn't already running) and
    /// send it a subscription-change request, returning the post-change
    /// size of the affected set (spec §4.G invariant: count tracks the set
    /// the command just changed, not a combined total across all sets).
    async fn send_subscriber_command(&self, cmd: SubscriberCommand) -> Result<usize> {
        let mut guard = self.inner.pubsub.lock().await;
        if guard.commands.is_none() {
            self.spawn_subscriber_task(&mut guard).await?;
        }
        let sender = guard.commands.clone().expect("subscriber task just spawned");
        drop(guard);

        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        sender
            .send((cmd, reply_tx))
            .map_err(|_| Error::Channel("pub/sub subscriber task is no longer running".into()))?;
        reply_rx.await.map_err(|_| Error::Channel("pub/sub subscriber task dropped the reply channel".into()))?
    }

    async fn spawn_subscriber_task(&self, guard: &mut tokio::sync::MutexGuard<'_, PubSubManager>) -> Result<()> {
        let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();
        let task = if self.inner.options.enable_event_based_pub_sub {
            let subscriber = RawSubscriber::connect(&self.inner.options).await?;
            let (message_tx, mut message_rx) = tokio::sync::mpsc::unbounded_channel();
            let client = self.clone();
            tokio::spawn(async move {
                while let Some(message) = message_rx.recv().await {
                    let channel = String::from_utf8_lossy(&message.channel).into_owned();
                    match message.pattern {
                        Some(pattern) => client.emit_pubsub(PubSubEvent::PMessageBuffer {
                            pattern: String::from_utf8_lossy(&pattern).into_owned(),
                            channel,
                            payload: message.payload,
                        }),
                        None => client.emit_pubsub(PubSubEvent::MessageBuffer { channel, payload: message.payload }),
                    }
                }
            });
            tokio::spawn(async move {
                let _ = subscriber.run_with_commands(message_tx, command_rx).await;
            })
        } else {
            let subscriber = NativeSubscriber::connect(&self.inner.options).await?;
            let events = subscriber.events();
            let forward = self.clone();
            events.on("message", move |msg| {
                forward.emit_pubsub(PubSubEvent::Message { channel: msg.channel.clone(), payload: msg.payload.clone() });
            });
            let forward = self.clone();
            events.on("messageBuffer", move |msg| {
                forward.emit_pubsub(PubSubEvent::MessageBuffer { channel: msg.channel.clone(), payload: msg.payload_bytes.clone() });
            });
            let forward = self.clone();
            events.on("pmessage", move |msg| {
                if let Some(pattern) = msg.pattern.clone() {
                    forward.emit_pubsub(PubSubEvent::PMessage { pattern, channel: msg.channel.clone(), payload: msg.payload.clone() });
                }
            });
            let forward = self.clone();
            events.on("pmessageBuffer", move |msg| {
                if let Some(pattern) = msg.pattern.clone() {
                    forward.emit_pubsub(PubSubEvent::PMessageBuffer { pattern, channel: msg.channel.clone(), payload: msg.payload_bytes.clone() });
                }
            });
            tokio::spawn(async move {
                let _ = subscriber.run_with_commands(command_rx).await;
            })
        };
        guard.task = Some(task);
        guard.commands = Some(command_tx);
        Ok(())
    }
}
