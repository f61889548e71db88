use std::cell::RefCell;

use log::{trace, warn};

use crate::event::{EditorEvent, EventHandler};

type Handlers = Vec<Box<dyn EventHandler>>;

/// Delivers editor events to subscribed handlers, synchronously and in
/// subscription order.
///
/// A handler may subscribe further handlers while it runs; they start
/// receiving events from the next emit. Emitting from inside a handler is
/// dropped with a warning.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<Handlers>,
    /// Subscribed while an emit was running
    joining: RefCell<Handlers>,
}

/// Subscribers belong to one session, so a clone starts empty
impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        match self.handlers.try_borrow_mut() {
            Ok(mut handlers) => handlers.push(handler),
            Err(_) => self.joining.borrow_mut().push(handler),
        }
    }

    pub fn handler_count(&self) -> usize {
        let active = self.handlers.try_borrow().map_or(0, |handlers| handlers.len());
        active + self.joining.borrow().len()
    }

    pub fn emit(&self, event: EditorEvent) {
        let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
            warn!("Dropped {:?} emitted from inside an event handler", event);
            return;
        };
        trace!("Emitting {:?} to {} handlers", event, handlers.len());
        for handler in handlers.iter_mut() {
            handler.handle_event(&event);
        }
        handlers.append(&mut self.joining.borrow_mut());
    }
}
