//! Topic-based publish/subscribe with staged subscription changes
//!
//! Subscribing and unsubscribing never touch the live table directly. Both
//! are queued and applied by [`EventBus::process_events`] once per frame, so
//! handlers can change subscriptions while a publish is being delivered.

use crate::ecs::ComponentRef;
use crate::engine::EngineContext;
use crate::script::{ScriptError, ScriptFn, Value};
use std::cell::RefCell;
use std::collections::HashMap;

/// A subscriber/handler pair for one topic
#[derive(Debug, Clone)]
pub struct EventSubscription {
    /// Topic name
    pub topic: String,
    /// Receiving component, passed to the handler as `self`
    pub subscriber: ComponentRef,
    /// Handler function
    pub handler: ScriptFn,
}

impl EventSubscription {
    /// Identity match on subscriber and handler
    fn matches(&self, subscriber: &ComponentRef, handler: &ScriptFn) -> bool {
        self.subscriber.ptr_eq(subscriber) && self.handler.ptr_eq(handler)
    }
}

/// Event bus owned by the engine context
#[derive(Debug, Default)]
pub struct EventBus {
    subscriptions: RefCell<HashMap<String, Vec<EventSubscription>>>,
    pending_subscribe: RefCell<Vec<EventSubscription>>,
    pending_unsubscribe: RefCell<Vec<EventSubscription>>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Deliver `payload` to every handler subscribed to `topic`, in subscription order
    pub fn publish(&self, ctx: &EngineContext, topic: &str, payload: &Value) {
        let handlers: Vec<EventSubscription> = match self.subscriptions.borrow().get(topic) {
            Some(subs) => subs.clone(),
            None => return,
        };
        
        log::trace!("Publishing {} to {} handlers", topic, handlers.len());
        for sub in &handlers {
            match sub.handler.call(ctx, &sub.subscriber, std::slice::from_ref(payload)) {
                Ok(_) => {}
                Err(ScriptError::Runtime(detail)) => log::error!("Event handling error: {detail}"),
                Err(ScriptError::Fatal(err)) => ctx.report_fatal(err),
            }
        }
    }
    
    /// Queue a subscription
    pub fn subscribe(&self, topic: impl Into<String>, subscriber: &ComponentRef, handler: &ScriptFn) {
        self.pending_subscribe.borrow_mut().push(EventSubscription {
            topic: topic.into(),
            subscriber: subscriber.clone(),
            handler: handler.clone(),
        });
    }
    
    /// Queue an unsubscription
    pub fn unsubscribe(&self, topic: impl Into<String>, subscriber: &ComponentRef, handler: &ScriptFn) {
        self.pending_unsubscribe.borrow_mut().push(EventSubscription {
            topic: topic.into(),
            subscriber: subscriber.clone(),
            handler: handler.clone(),
        });
    }
    
    /// Apply queued subscriptions, then queued unsubscriptions
    pub fn process_events(&self) {
        let subscribes = std::mem::take(&mut *self.pending_subscribe.borrow_mut());
        let unsubscribes = std::mem::take(&mut *self.pending_unsubscribe.borrow_mut());
        let mut table = self.subscriptions.borrow_mut();
        
        for sub in subscribes {
            log::debug!("Subscribed {:?} to {}", sub.subscriber, sub.topic);
            table.entry(sub.topic.clone()).or_default().push(sub);
        }
        
        for request in unsubscribes {
            let Some(subs) = table.get_mut(&request.topic) else {
                continue;
            };
            if let Some(index) = subs.iter().position(|s| s.matches(&request.subscriber, &request.handler)) {
                subs.remove(index);
                log::debug!("Unsubscribed {:?} from {}", request.subscriber, request.topic);
            }
            if subs.is_empty() {
                table.remove(&request.topic);
            }
        }
    }
    
    /// Live subscriber count for a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscriptions.borrow().get(topic).map_or(0, Vec::len)
    }
    
    /// Whether a topic has any live subscriber
    pub fn has_topic(&self, topic: &str) -> bool {
        self.subscriptions.borrow().contains_key(topic)
    }
}
