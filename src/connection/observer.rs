//! Connection lifecycle notifications

use log::trace;
use std::sync::{Mutex, PoisonError, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Disconnected,
    Reconnected,
}

/// Anything holding broker objects that die with the connection
pub trait ConnectionObserver: Send + Sync {
    fn on_connection_event(&self, event: ConnectionEvent);
}

/// Observer list embedded by value in every connection
///
/// Holds weak references only; observers that have been dropped are pruned
/// on the next notification.
#[derive(Default)]
pub struct ConnectionSubject {
    observers: Mutex<Vec<Weak<dyn ConnectionObserver>>>,
}

impl ConnectionSubject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, observer: Weak<dyn ConnectionObserver>) {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        if !observers.iter().any(|existing| existing.ptr_eq(&observer)) {
            observers.push(observer);
        }
    }

    pub fn detach(&self, observer: &Weak<dyn ConnectionObserver>) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|existing| !existing.ptr_eq(observer));
    }

    /// Deliver `event` to every live observer
    ///
    /// The list lock is released before observers run, so an observer may
    /// attach or detach from inside its callback.
    pub fn notify(&self, event: ConnectionEvent) {
        let live: Vec<_> = {
            let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
            observers.retain(|observer| observer.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        trace!("notifying {} observer(s) of {:?}", live.len(), event);
        for observer in live {
            observer.on_connection_event(event);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<ConnectionEvent>>,
    }

    impl ConnectionObserver for Recorder {
        fn on_connection_event(&self, event: ConnectionEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_notify_reaches_attached_observers_once() {
        let subject = ConnectionSubject::new();
        let recorder = Arc::new(Recorder::default());
        let weak: Weak<dyn ConnectionObserver> = Arc::downgrade(&recorder) as Weak<dyn ConnectionObserver>;

        subject.attach(weak.clone());
        subject.attach(weak.clone());
        subject.notify(ConnectionEvent::Disconnected);

        assert_eq!(*recorder.events.lock().unwrap(), vec![ConnectionEvent::Disconnected]);

        subject.detach(&weak);
        subject.notify(ConnectionEvent::Reconnected);
        assert_eq!(recorder.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_dropped_observers_are_pruned() {
        let subject = ConnectionSubject::new();
        let recorder = Arc::new(Recorder::default());
        subject.attach(Arc::downgrade(&recorder) as Weak<dyn ConnectionObserver>);
        assert_eq!(subject.observer_count(), 1);

        drop(recorder);
        subject.notify(ConnectionEvent::Reconnected);
        assert_eq!(subject.observer_count(), 0);
    }
}
