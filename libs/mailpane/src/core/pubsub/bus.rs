// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Topic-based event bus with synchronous, in-order dispatch.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use super::events::{Event, EventListener};

/// Event bus shared by the link graph and the runtime manager.
///
/// - Listeners are held weakly; dropping the `Arc` unsubscribes.
/// - `publish` delivers to every live listener of the topic before returning,
///   in subscription order.
/// - A listener that is already handling an event (re-entrant publish) is
///   skipped for the nested event rather than deadlocking.
pub struct EventBus {
    topics: Mutex<HashMap<String, Vec<Weak<Mutex<dyn EventListener>>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe a listener to a topic
    ///
    /// # Example
    /// ```ignore
    /// let listener = Arc::new(Mutex::new(MyListener));
    /// bus.subscribe(topics::DATA, listener.clone());
    /// ```
    pub fn subscribe(&self, topic: &str, listener: Arc<Mutex<dyn EventListener>>) {
        let weak_listener = Arc::downgrade(&listener);
        self.topics
            .lock()
            .entry(topic.to_string())
            .or_default()
            .push(weak_listener);
    }

    /// Publish an event on its own topic ([`Event::topic`]).
    pub fn emit(&self, event: &Event) {
        self.publish(&event.topic(), event);
    }

    /// Publish event to topic.
    pub fn publish(&self, topic: &str, event: &Event) {
        // Collect live listeners and release the topic lock before dispatch so
        // listeners may subscribe or publish from inside `on_event`.
        let live_listeners: Vec<_> = {
            let mut topics = self.topics.lock();
            let Some(subscribers) = topics.get_mut(topic) else {
                return;
            };
            subscribers.retain(|weak| weak.strong_count() > 0);
            let live: Vec<_> = subscribers.iter().filter_map(Weak::upgrade).collect();
            if subscribers.is_empty() {
                topics.remove(topic);
            }
            live
        };

        for listener in live_listeners {
            match listener.try_lock() {
                Some(mut guard) => {
                    if let Err(e) = guard.on_event(event) {
                        tracing::warn!("[EventBus] Listener on '{}' failed: {}", topic, e);
                    }
                }
                None => {
                    tracing::debug!(
                        "[EventBus] Listener on '{}' busy, skipping nested event",
                        topic
                    );
                }
            }
        }
    }

    /// Number of live listeners on a topic.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .get(topic)
            .map(|subs| subs.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics: Vec<String> = self.topics.lock().keys().cloned().collect();
        f.debug_struct("EventBus").field("topics", &topics).finish()
    }
}
