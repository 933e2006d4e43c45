//! Attribute lifecycle hooks.
//!
//! Observers are optional: the service works with an empty list and never
//! depends on an observer running.

use crate::model::attribute::Attribute;

/// Receives attribute lifecycle notifications.
pub trait AttributeObserver {
    /// Called after an attribute was created or updated and persisted.
    fn attribute_saved(&self, attribute: &Attribute);
}

/// Ordered observer list owned by the service.
#[derive(Default)]
pub struct AttributeObservers {
    observers: Vec<Box<dyn AttributeObserver>>,
}

impl AttributeObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn AttributeObserver>) {
        self.observers.push(observer);
    }

    /// Notifies observers in subscription order.
    pub fn saved(&self, attribute: &Attribute) {
        for observer in &self.observers {
            observer.attribute_saved(attribute);
        }
    }
}
