//! In-process change notifications, keyed by table name.
//!
//! Subscribers register a callback per table and stay registered for as long
//! as they hold the returned [`Subscription`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;

use crate::domain::errors::DomainError;
use crate::domain::ports::EventBroadcaster;

pub const ARTICLES: &str = "articles";
pub const SALES: &str = "sales";

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// A named application event, e.g. `sale-completed`.
    Broadcast(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub payload: Value,
}

impl ChangeEvent {
    pub fn new(table: &str, kind: ChangeKind, payload: Value) -> Self {
        Self {
            table: table.to_string(),
            kind,
            payload,
        }
    }
}

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    by_table: HashMap<String, Vec<(u64, Callback)>>,
}

#[derive(Clone, Default)]
pub struct ChangeFeed {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed").finish_non_exhaustive()
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, table: &str, callback: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .by_table
            .entry(table.to_string())
            .or_default()
            .push((id, Arc::new(callback)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            table: table.to_string(),
            id,
        }
    }

    /// Delivers `event` to every subscriber of its table.
    pub fn publish(&self, event: ChangeEvent) {
        // Callbacks run outside the lock so they may subscribe or publish.
        let callbacks: Vec<Callback> = lock(&self.registry)
            .by_table
            .get(&event.table)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();
        log::debug!(
            "change on {} ({:?}) to {} subscriber(s)",
            event.table,
            event.kind,
            callbacks.len()
        );
        for callback in callbacks {
            callback(&event);
        }
    }

    pub fn subscriber_count(&self, table: &str) -> usize {
        lock(&self.registry)
            .by_table
            .get(table)
            .map_or(0, Vec::len)
    }
}

impl EventBroadcaster for ChangeFeed {
    fn broadcast(&self, event: &str, payload: Value) -> Result<(), DomainError> {
        self.publish(ChangeEvent::new(
            SALES,
            ChangeKind::Broadcast(event.to_string()),
            payload,
        ));
        Ok(())
    }
}

/// Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    table: String,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(subs) = registry.by_table.get_mut(&self.table) {
            subs.retain(|(id, _)| *id != self.id);
            if subs.is_empty() {
                registry.by_table.remove(&self.table);
            }
        }
    }
}
