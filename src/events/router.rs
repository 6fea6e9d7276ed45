//! Event router
//!
//! Delivers events synchronously to listeners in registration order.
//! Listeners must return quickly; anything slow belongs on a channel
//! (see [`ChannelListener`]).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::Event;

pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &Event);
}

/// Fans events out to registered listeners
#[derive(Default)]
pub struct EventRouter {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
    /// Set by the first network-initialization-complete event
    network_ready: AtomicBool,
    closed: AtomicBool,
}

fn same_listener(a: &Arc<dyn EventListener>, b: &Arc<dyn EventListener>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Remove a listener by identity. Returns whether it was registered.
    pub fn unsubscribe(&self, listener: &Arc<dyn EventListener>) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|registered| !same_listener(registered, listener));
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver `event` to every listener. Returns how many received it.
    ///
    /// Network-initialization-complete is delivered only the first time.
    pub fn publish(&self, event: Event) -> usize {
        if self.closed.load(Ordering::Acquire) {
            trace!("Router closed, dropping {:?}", event.kind());
            return 0;
        }

        if matches!(event, Event::NetworkInitializationComplete)
            && self.network_ready.swap(true, Ordering::AcqRel)
        {
            debug!("Suppressing repeated network initialization event");
            return 0;
        }

        // Snapshot so listeners may (un)subscribe from inside on_event
        let listeners: Vec<Arc<dyn EventListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in &listeners {
            listener.on_event(&event);
        }
        listeners.len()
    }

    pub fn is_network_ready(&self) -> bool {
        self.network_ready.load(Ordering::Acquire)
    }

    /// Stop delivering events and drop every listener
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Forwards events onto an unbounded channel for async consumers
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<Event>,
}

impl ChannelListener {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Event>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { sender }), receiver)
    }
}

impl EventListener for ChannelListener {
    fn on_event(&self, event: &Event) {
        // receiver gone means nobody is listening any more
        let _ = self.sender.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use zwave_shared::NodeId;

    use super::*;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl EventListener for Recorder {
        fn on_event(&self, _event: &Event) {
            self.log.lock().unwrap().push(self.name);
        }
    }

    #[test]
    fn test_delivers_in_registration_order() {
        let router = EventRouter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second", "third"] {
            router.subscribe(Arc::new(Recorder {
                name,
                log: log.clone(),
            }));
        }

        let delivered = router.publish(Event::NodeFailed { node: NodeId(2) });

        assert_eq!(delivered, 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_by_identity() {
        let router = EventRouter::new();
        let (a, mut a_rx) = ChannelListener::new();
        let (b, mut b_rx) = ChannelListener::new();
        let a: Arc<dyn EventListener> = a;
        router.subscribe(a.clone());
        router.subscribe(b);

        assert!(router.unsubscribe(&a));
        assert!(!router.unsubscribe(&a));

        router.publish(Event::NodeFailed { node: NodeId(3) });
        assert!(a_rx.try_recv().is_err());
        assert!(b_rx.try_recv().is_ok());
    }

    #[test]
    fn test_network_ready_latches_once() {
        let router = EventRouter::new();
        let (listener, mut rx) = ChannelListener::new();
        router.subscribe(listener);

        assert!(!router.is_network_ready());
        assert_eq!(router.publish(Event::NetworkInitializationComplete), 1);
        assert_eq!(router.publish(Event::NetworkInitializationComplete), 0);
        assert!(router.is_network_ready());

        assert_eq!(rx.try_recv().unwrap(), Event::NetworkInitializationComplete);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_shutdown_drops_listeners() {
        let router = EventRouter::new();
        let (listener, mut rx) = ChannelListener::new();
        router.subscribe(listener);

        router.shutdown();

        assert_eq!(router.listener_count(), 0);
        assert_eq!(router.publish(Event::NodeFailed { node: NodeId(1) }), 0);
        assert!(rx.try_recv().is_err());
    }
}
