//! In-process broker behind the `memory://` scheme
//!
//! Implements the whole channel capability set against shared in-memory
//! state: exchanges of every kind, queues with ready and unacked messages,
//! per-channel prefetch, native transactions and consumer tags. Several
//! transports created from the same [`MemoryBroker`] see the same queues,
//! which is what lets one process publish, consume and fail over without a
//! network broker.

use crate::core::sync::{handle_mutex_poison, lock};
use crate::error::{Error, Result};
use crate::message::{Acknowledger, HeaderValue, Headers, Message};
use crate::transport::{
    Arguments, Binding, Channel, ConsumeCallback, Delivery, Driver, Dsn, ExchangeDefinition,
    ExchangeKind, QueueDefinition, Transport,
};
use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Longest a blocked consumer waits before its callback gets an idle tick
pub const IDLE_TICK: Duration = Duration::from_millis(100);

const DEFAULT_USER: &str = "guest";

#[derive(Default)]
pub struct MemoryBroker {
    state: Mutex<BrokerState>,
    activity: Condvar,
}

#[derive(Default)]
struct BrokerState {
    vhosts: HashMap<String, VirtualHost>,
    channels: HashMap<u64, ChannelState>,
    connections: HashSet<u64>,
    users: HashMap<String, String>,
    down_hosts: HashSet<String>,
    next_id: u64,
}

#[derive(Default)]
struct VirtualHost {
    exchanges: HashMap<String, ExchangeState>,
    queues: HashMap<String, QueueState>,
}

struct ExchangeState {
    kind: ExchangeKind,
    routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq)]
enum Destination {
    Queue(String),
    Exchange(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Route {
    destination: Destination,
    routing_key: String,
    arguments: Arguments,
}

struct QueueState {
    ready: VecDeque<Stored>,
}

#[derive(Clone)]
struct Stored {
    message: Message,
    exchange: String,
    routing_key: String,
    redelivered: bool,
    enqueued_at: Instant,
}

impl Stored {
    fn is_expired(&self) -> bool {
        self.message
            .options()
            .expiration()
            .is_some_and(|ttl| self.enqueued_at.elapsed() >= ttl)
    }
}

struct ChannelState {
    connection_id: u64,
    vhost: String,
    next_tag: u64,
    prefetch: u16,
    unacked: BTreeMap<u64, (String, Stored)>,
    transaction: Option<Vec<Pending>>,
    consumers: HashSet<String>,
}

struct Pending {
    exchange: String,
    routing_key: String,
    message: Message,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require credentials; once any user exists unknown users are rejected
    pub fn add_user(&self, username: &str, password: &str) -> Result<()> {
        let mut state = lock(&self.state)?;
        state.users.insert(username.to_string(), password.to_string());
        Ok(())
    }

    /// Make connects to `host` fail as if the broker were unreachable
    pub fn set_host_down(&self, host: &str, down: bool) -> Result<()> {
        let mut state = lock(&self.state)?;
        if down {
            state.down_hosts.insert(host.to_string());
        } else {
            state.down_hosts.remove(host);
        }
        Ok(())
    }

    /// Ready messages in a queue, zero when the queue does not exist
    pub fn queue_len(&self, vhost: &str, queue: &str) -> Result<usize> {
        let state = lock(&self.state)?;
        Ok(state
            .vhosts
            .get(vhost)
            .and_then(|vhost| vhost.queues.get(queue))
            .map_or(0, |queue| queue.ready.len()))
    }

    /// Delivered but unanswered messages across every open channel
    pub fn unacked_len(&self) -> Result<usize> {
        let state = lock(&self.state)?;
        Ok(state.channels.values().map(|channel| channel.unacked.len()).sum())
    }

    pub fn connection_count(&self) -> Result<usize> {
        Ok(lock(&self.state)?.connections.len())
    }

    fn connect(&self, dsn: &Dsn) -> Result<u64> {
        let mut state = lock(&self.state)?;
        if state.down_hosts.contains(&dsn.host) {
            return Err(Error::Connection {
                endpoint: dsn.endpoint(),
                message: "host is unreachable".to_string(),
            });
        }

        let username = dsn.username.as_deref().unwrap_or(DEFAULT_USER);
        if !state.users.is_empty() {
            let password = dsn.password.as_deref().unwrap_or_default();
            if state.users.get(username).map(String::as_str) != Some(password) {
                return Err(Error::BadCredentials {
                    endpoint: dsn.endpoint(),
                    username: username.to_string(),
                });
            }
        }

        state.vhosts.entry(dsn.vhost.clone()).or_default();
        state.next_id += 1;
        let id = state.next_id;
        state.connections.insert(id);
        debug!("memory broker: connection {} opened to {}", id, dsn.endpoint());
        Ok(id)
    }

    fn disconnect(&self, connection_id: u64) -> Result<()> {
        let mut state = lock(&self.state)?;
        state.connections.remove(&connection_id);
        let channel_ids: Vec<u64> = state
            .channels
            .iter()
            .filter(|(_, channel)| channel.connection_id == connection_id)
            .map(|(id, _)| *id)
            .collect();
        for id in channel_ids {
            Self::drop_channel(&mut state, id);
        }
        debug!("memory broker: connection {} closed", connection_id);
        self.activity.notify_all();
        Ok(())
    }

    fn open_channel(&self, connection_id: u64, vhost: &str) -> Result<u64> {
        let mut state = lock(&self.state)?;
        if !state.connections.contains(&connection_id) {
            return Err(Error::channel("connection is closed"));
        }
        state.next_id += 1;
        let id = state.next_id;
        state.channels.insert(
            id,
            ChannelState {
                connection_id,
                vhost: vhost.to_string(),
                next_tag: 0,
                prefetch: 0,
                unacked: BTreeMap::new(),
                transaction: None,
                consumers: HashSet::new(),
            },
        );
        Ok(id)
    }

    /// Close a channel, returning its unacked deliveries to the head of their queues
    fn drop_channel(state: &mut BrokerState, channel_id: u64) {
        let Some(channel) = state.channels.remove(&channel_id) else {
            return;
        };
        let Some(vhost) = state.vhosts.get_mut(&channel.vhost) else {
            return;
        };
        for (_, (queue, mut stored)) in channel.unacked.into_iter().rev() {
            if let Some(queue) = vhost.queues.get_mut(&queue) {
                stored.redelivered = true;
                queue.ready.push_front(stored);
            }
        }
    }

    /// Run `f` against an open channel and the vhost it lives in
    fn with_channel<T>(
        &self,
        channel_id: u64,
        f: impl FnOnce(&mut ChannelState, &mut VirtualHost) -> Result<T>,
    ) -> Result<T> {
        let mut state = lock(&self.state)?;
        let BrokerState {
            vhosts, channels, ..
        } = &mut *state;
        let channel = channels
            .get_mut(&channel_id)
            .ok_or_else(|| Error::channel("channel is closed"))?;
        let vhost = vhosts
            .get_mut(&channel.vhost)
            .ok_or_else(|| Error::channel(format!("vhost '{}' does not exist", channel.vhost)))?;
        f(channel, vhost)
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, BrokerState>> {
        lock(&self.state)
    }
}

impl VirtualHost {
    fn queue_mut(&mut self, name: &str) -> Result<&mut QueueState> {
        self.queues
            .get_mut(name)
            .ok_or_else(|| Error::channel(format!("no queue '{name}'")))
    }

    fn exchange_mut(&mut self, name: &str) -> Result<&mut ExchangeState> {
        self.exchanges
            .get_mut(name)
            .ok_or_else(|| Error::channel(format!("no exchange '{name}'")))
    }

    fn enqueue(&mut self, exchange: &str, routing_key: &str, message: &Message) -> Result<usize> {
        let mut queues = BTreeSet::new();
        let mut visited = HashSet::new();
        self.resolve(exchange, routing_key, message.headers(), &mut visited, &mut queues)?;

        for name in &queues {
            if let Some(queue) = self.queues.get_mut(name) {
                queue.ready.push_back(Stored {
                    message: message.clone(),
                    exchange: exchange.to_string(),
                    routing_key: routing_key.to_string(),
                    redelivered: false,
                    enqueued_at: Instant::now(),
                });
            }
        }
        trace!("routed '{}' via '{}' to {} queue(s)", routing_key, exchange, queues.len());
        Ok(queues.len())
    }

    /// Collect every queue reachable from `exchange` for this message
    fn resolve(
        &self,
        exchange: &str,
        routing_key: &str,
        headers: &Headers,
        visited: &mut HashSet<String>,
        queues: &mut BTreeSet<String>,
    ) -> Result<()> {
        if exchange.is_empty() {
            if self.queues.contains_key(routing_key) {
                queues.insert(routing_key.to_string());
            }
            return Ok(());
        }
        if !visited.insert(exchange.to_string()) {
            return Ok(());
        }

        let state = self
            .exchanges
            .get(exchange)
            .ok_or_else(|| Error::channel(format!("no exchange '{exchange}'")))?;

        for route in &state.routes {
            let matched = match state.kind {
                ExchangeKind::Direct => route.routing_key == routing_key,
                ExchangeKind::Fanout => true,
                ExchangeKind::Topic => topic_matches(routing_key, &route.routing_key),
                ExchangeKind::Headers => headers_match(headers, &route.arguments),
            };
            if !matched {
                continue;
            }
            match &route.destination {
                Destination::Queue(name) => {
                    queues.insert(name.clone());
                }
                Destination::Exchange(name) => {
                    self.resolve(name, routing_key, headers, visited, queues)?;
                }
            }
        }
        Ok(())
    }
}

/// Topic pattern matching over dot-separated words
///
/// `*` matches exactly one word, `#` matches zero or more words.
fn topic_matches(routing_key: &str, pattern: &str) -> bool {
    let key_words: Vec<&str> = routing_key.split('.').collect();
    let pattern_words: Vec<&str> = pattern.split('.').collect();
    topic_matches_from(&key_words, &pattern_words)
}

fn topic_matches_from(key: &[&str], pattern: &[&str]) -> bool {
    match pattern.split_first() {
        None => key.is_empty(),
        Some((&"#", rest)) => {
            topic_matches_from(key, rest)
                || (!key.is_empty() && topic_matches_from(&key[1..], pattern))
        }
        Some((&"*", rest)) => !key.is_empty() && topic_matches_from(&key[1..], rest),
        Some((word, rest)) => key.first() == Some(word) && topic_matches_from(&key[1..], rest),
    }
}

/// Headers exchange matching, `x-match` selects `all` (default) or `any`
fn headers_match(headers: &Headers, arguments: &Arguments) -> bool {
    let match_any = matches!(
        arguments.get("x-match").and_then(HeaderValue::as_str),
        Some("any")
    );
    let mut expected = arguments
        .iter()
        .filter(|(name, _)| !name.starts_with("x-"))
        .peekable();
    if expected.peek().is_none() {
        return true;
    }

    let mut matches = expected.map(|(name, value)| headers.find(name) == Some(value));
    if match_any {
        matches.any(|matched| matched)
    } else {
        matches.all(|matched| matched)
    }
}

/// Take the next unexpired delivery for a channel
fn take_delivery(
    channel: &mut ChannelState,
    vhost: &mut VirtualHost,
    queue: &str,
    respect_prefetch: bool,
) -> Result<Option<Delivery>> {
    if respect_prefetch
        && channel.prefetch > 0
        && channel.unacked.len() >= usize::from(channel.prefetch)
    {
        return Ok(None);
    }

    let ready = &mut vhost.queue_mut(queue)?.ready;
    let stored = loop {
        match ready.pop_front() {
            Some(stored) if stored.is_expired() => continue,
            Some(stored) => break stored,
            None => return Ok(None),
        }
    };

    channel.next_tag += 1;
    let delivery_tag = channel.next_tag;
    let delivery = Delivery {
        message: stored.message.clone(),
        delivery_tag,
        exchange: stored.exchange.clone(),
        routing_key: stored.routing_key.clone(),
        redelivered: stored.redelivered,
    };
    channel.unacked.insert(delivery_tag, (queue.to_string(), stored));
    Ok(Some(delivery))
}

/// Shared between a transport and the channels it opened
struct LinkState {
    connection: Mutex<Option<u64>>,
    read_timeout_ms: AtomicU64,
}

impl LinkState {
    fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.load(Ordering::Acquire))
    }
}

pub struct MemoryTransport {
    broker: Arc<MemoryBroker>,
    dsn: Dsn,
    link: Arc<LinkState>,
}

impl MemoryTransport {
    pub fn new(broker: Arc<MemoryBroker>, dsn: Dsn) -> Self {
        let read_timeout = dsn.read_timeout().unwrap_or_default();
        Self {
            broker,
            dsn,
            link: Arc::new(LinkState {
                connection: Mutex::new(None),
                read_timeout_ms: AtomicU64::new(read_timeout.as_millis() as u64),
            }),
        }
    }
}

impl Transport for MemoryTransport {
    fn endpoint(&self) -> String {
        self.dsn.endpoint()
    }

    fn connect(&self) -> Result<()> {
        let mut connection = lock(&self.link.connection)?;
        if connection.is_none() {
            *connection = Some(self.broker.connect(&self.dsn)?);
        }
        Ok(())
    }

    fn disconnect(&self) -> Result<()> {
        let connection = lock(&self.link.connection)?.take();
        match connection {
            Some(id) => self.broker.disconnect(id),
            None => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        matches!(lock(&self.link.connection), Ok(guard) if guard.is_some())
    }

    fn read_timeout(&self) -> Duration {
        self.link.read_timeout()
    }

    fn set_read_timeout(&self, timeout: Duration) {
        self.link
            .read_timeout_ms
            .store(timeout.as_millis() as u64, Ordering::Release);
    }

    fn open_channel(&self) -> Result<Arc<dyn Channel>> {
        let connection = *lock(&self.link.connection)?;
        let connection_id = connection.ok_or_else(|| Error::Connection {
            endpoint: self.endpoint(),
            message: "not connected".to_string(),
        })?;
        let id = self.broker.open_channel(connection_id, &self.dsn.vhost)?;
        Ok(Arc::new(MemoryChannel {
            id,
            broker: Arc::clone(&self.broker),
            link: Arc::clone(&self.link),
        }))
    }
}

pub struct MemoryChannel {
    id: u64,
    broker: Arc<MemoryBroker>,
    link: Arc<LinkState>,
}

impl MemoryChannel {
    fn register_consumer(&self, queue: &str, consumer_tag: &str) -> Result<()> {
        self.broker.with_channel(self.id, |channel, vhost| {
            vhost.queue_mut(queue)?;
            if !channel.consumers.insert(consumer_tag.to_string()) {
                return Err(Error::channel(format!(
                    "consumer tag '{consumer_tag}' is already in use"
                )));
            }
            Ok(())
        })
    }

    fn consume_until_done(
        &self,
        queue: &str,
        consumer_tag: &str,
        callback: &mut ConsumeCallback<'_>,
    ) -> Result<()> {
        let mut last_delivery = Instant::now();
        loop {
            let next = self.broker.with_channel(self.id, |channel, vhost| {
                if !channel.consumers.contains(consumer_tag) {
                    return Ok(None);
                }
                take_delivery(channel, vhost, queue, true).map(Some)
            })?;

            let delivery = match next {
                // consumer tag was cancelled
                None => return Ok(()),
                Some(delivery) => delivery,
            };

            if let Some(delivery) = delivery {
                last_delivery = Instant::now();
                if !callback(Some(delivery))? {
                    return Ok(());
                }
                continue;
            }

            let read_timeout = self.link.read_timeout();
            let mut wait = IDLE_TICK;
            if !read_timeout.is_zero() {
                let idle = last_delivery.elapsed();
                if idle >= read_timeout {
                    return Err(Error::ConsumerTimeoutExceed {
                        timeout: read_timeout,
                    });
                }
                wait = wait.min(read_timeout - idle);
            }

            let state = self.broker.lock_state()?;
            drop(handle_mutex_poison(
                self.broker.activity.wait_timeout(state, wait),
                Error::channel,
            )?);

            if !callback(None)? {
                return Ok(());
            }
        }
    }
}

impl Acknowledger for MemoryChannel {
    fn ack(&self, delivery_tag: u64) -> Result<()> {
        self.broker.with_channel(self.id, |channel, _| {
            channel
                .unacked
                .remove(&delivery_tag)
                .map(|_| ())
                .ok_or_else(|| Error::channel(format!("unknown delivery tag {delivery_tag}")))
        })?;
        self.broker.activity.notify_all();
        Ok(())
    }

    fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<()> {
        self.broker.with_channel(self.id, |channel, vhost| {
            let (queue, mut stored) = channel
                .unacked
                .remove(&delivery_tag)
                .ok_or_else(|| Error::channel(format!("unknown delivery tag {delivery_tag}")))?;
            if requeue {
                if let Some(queue) = vhost.queues.get_mut(&queue) {
                    stored.redelivered = true;
                    queue.ready.push_front(stored);
                }
            }
            Ok(())
        })?;
        self.broker.activity.notify_all();
        Ok(())
    }
}

impl Channel for MemoryChannel {
    fn set_prefetch_count(&self, count: u16) -> Result<()> {
        self.broker.with_channel(self.id, |channel, _| {
            channel.prefetch = count;
            Ok(())
        })
    }

    fn prefetch_count(&self) -> u16 {
        self.broker
            .with_channel(self.id, |channel, _| Ok(channel.prefetch))
            .unwrap_or_default()
    }

    fn read_timeout(&self) -> Duration {
        self.link.read_timeout()
    }

    fn tx_select(&self) -> Result<()> {
        self.broker.with_channel(self.id, |channel, _| {
            channel.transaction.get_or_insert_with(Vec::new);
            Ok(())
        })
    }

    fn tx_commit(&self) -> Result<()> {
        self.broker.with_channel(self.id, |channel, vhost| {
            let pending = channel
                .transaction
                .as_mut()
                .ok_or_else(|| Error::transaction("channel is not in transactional mode"))?;
            for publish in pending.drain(..) {
                vhost.enqueue(&publish.exchange, &publish.routing_key, &publish.message)?;
            }
            Ok(())
        })?;
        self.broker.activity.notify_all();
        Ok(())
    }

    fn tx_rollback(&self) -> Result<()> {
        self.broker.with_channel(self.id, |channel, _| {
            channel
                .transaction
                .as_mut()
                .ok_or_else(|| Error::transaction("channel is not in transactional mode"))?
                .clear();
            Ok(())
        })
    }

    fn declare_exchange(&self, definition: &ExchangeDefinition) -> Result<()> {
        if definition.name.is_empty() {
            return Err(Error::channel("the default exchange cannot be declared"));
        }
        self.broker.with_channel(self.id, |_, vhost| {
            match vhost.exchanges.get(&definition.name) {
                Some(existing) if existing.kind != definition.kind => Err(Error::channel(format!(
                    "exchange '{}' already declared as {}",
                    definition.name, existing.kind
                ))),
                Some(_) => Ok(()),
                None => {
                    vhost.exchanges.insert(
                        definition.name.clone(),
                        ExchangeState {
                            kind: definition.kind,
                            routes: Vec::new(),
                        },
                    );
                    Ok(())
                }
            }
        })
    }

    fn bind_exchange(&self, destination: &str, binding: &Binding) -> Result<()> {
        self.broker.with_channel(self.id, |_, vhost| {
            vhost.exchange_mut(destination)?;
            add_route(vhost, binding, Destination::Exchange(destination.to_string()))
        })
    }

    fn unbind_exchange(&self, destination: &str, binding: &Binding) -> Result<()> {
        self.broker.with_channel(self.id, |_, vhost| {
            remove_route(vhost, binding, Destination::Exchange(destination.to_string()))
        })
    }

    fn declare_queue(&self, definition: &QueueDefinition, passive: bool) -> Result<u32> {
        self.broker.with_channel(self.id, |_, vhost| {
            if !passive && !vhost.queues.contains_key(&definition.name) {
                vhost.queues.insert(
                    definition.name.clone(),
                    QueueState {
                        ready: VecDeque::new(),
                    },
                );
            }
            let queue = vhost.queue_mut(&definition.name)?;
            queue.ready.retain(|stored| !stored.is_expired());
            Ok(queue.ready.len() as u32)
        })
    }

    fn bind_queue(&self, queue: &str, binding: &Binding) -> Result<()> {
        self.broker.with_channel(self.id, |_, vhost| {
            vhost.queue_mut(queue)?;
            add_route(vhost, binding, Destination::Queue(queue.to_string()))
        })
    }

    fn unbind_queue(&self, queue: &str, binding: &Binding) -> Result<()> {
        self.broker.with_channel(self.id, |_, vhost| {
            remove_route(vhost, binding, Destination::Queue(queue.to_string()))
        })
    }

    fn publish(&self, exchange: &str, routing_key: &str, message: &Message) -> Result<()> {
        self.broker.with_channel(self.id, |channel, vhost| {
            if let Some(pending) = channel.transaction.as_mut() {
                if !exchange.is_empty() {
                    vhost.exchange_mut(exchange)?;
                }
                pending.push(Pending {
                    exchange: exchange.to_string(),
                    routing_key: routing_key.to_string(),
                    message: message.clone(),
                });
                return Ok(());
            }
            vhost.enqueue(exchange, routing_key, message).map(|_| ())
        })?;
        self.broker.activity.notify_all();
        Ok(())
    }

    fn consume(
        &self,
        queue: &str,
        consumer_tag: &str,
        callback: &mut ConsumeCallback<'_>,
    ) -> Result<()> {
        self.register_consumer(queue, consumer_tag)?;
        let result = self.consume_until_done(queue, consumer_tag, callback);
        // the channel may already be gone after a disconnect
        let _ = self.broker.with_channel(self.id, |channel, _| {
            channel.consumers.remove(consumer_tag);
            Ok(())
        });
        result
    }

    fn get(&self, queue: &str) -> Result<Option<Delivery>> {
        self.broker
            .with_channel(self.id, |channel, vhost| take_delivery(channel, vhost, queue, false))
    }

    fn cancel(&self, consumer_tag: &str) -> Result<()> {
        self.broker.with_channel(self.id, |channel, _| {
            channel.consumers.remove(consumer_tag);
            Ok(())
        })?;
        self.broker.activity.notify_all();
        Ok(())
    }

    fn purge(&self, queue: &str) -> Result<u32> {
        self.broker.with_channel(self.id, |_, vhost| {
            let queue = vhost.queue_mut(queue)?;
            let purged = queue.ready.len() as u32;
            queue.ready.clear();
            Ok(purged)
        })
    }

    fn close(&self) -> Result<()> {
        let mut state = self.broker.lock_state()?;
        MemoryBroker::drop_channel(&mut state, self.id);
        drop(state);
        self.broker.activity.notify_all();
        Ok(())
    }

    fn is_open(&self) -> bool {
        matches!(self.broker.lock_state(), Ok(state) if state.channels.contains_key(&self.id))
    }
}

fn add_route(vhost: &mut VirtualHost, binding: &Binding, destination: Destination) -> Result<()> {
    if binding.exchange.is_empty() {
        return Err(Error::channel("cannot bind to the default exchange"));
    }
    let route = Route {
        destination,
        routing_key: binding.routing_key.clone(),
        arguments: binding.arguments.clone(),
    };
    let source = vhost.exchange_mut(&binding.exchange)?;
    if !source.routes.contains(&route) {
        source.routes.push(route);
    }
    Ok(())
}

fn remove_route(vhost: &mut VirtualHost, binding: &Binding, destination: Destination) -> Result<()> {
    let source = vhost.exchange_mut(&binding.exchange)?;
    source.routes.retain(|route| {
        !(route.destination == destination
            && route.routing_key == binding.routing_key
            && route.arguments == binding.arguments)
    });
    Ok(())
}

/// Driver for the `memory` scheme, every transport shares one broker
#[derive(Clone, Default)]
pub struct MemoryDriver {
    broker: Arc<MemoryBroker>,
}

impl MemoryDriver {
    pub fn new(broker: Arc<MemoryBroker>) -> Self {
        Self { broker }
    }

    pub fn broker(&self) -> &Arc<MemoryBroker> {
        &self.broker
    }
}

impl Driver for MemoryDriver {
    fn create_transport(&self, dsn: &Dsn) -> Result<Box<dyn Transport>> {
        Ok(Box::new(MemoryTransport::new(
            Arc::clone(&self.broker),
            dsn.clone(),
        )))
    }
}
