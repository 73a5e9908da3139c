//! Fan the editor's signals out to any number of listeners.

use shadow_editor_core::signal::{Notifier, Signal};

pub struct BusNotifier {
    bus: bus::Bus<Signal>,
}
impl BusNotifier {
    /// A full bus drops signals rather than blocking the editor.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            bus: bus::Bus::new(capacity),
        }
    }
    /// Get a receiver of every signal sent from now on.
    pub fn subscribe(&mut self) -> bus::BusReader<Signal> {
        self.bus.add_rx()
    }
}
impl Default for BusNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}
impl Notifier for BusNotifier {
    fn notify(&mut self, signal: Signal) {
        if let Err(signal) = self.bus.try_broadcast(signal) {
            log::warn!("Signal bus full, dropped {signal:?}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn fans_out() {
        let mut notifier = BusNotifier::new(4);
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();
        notifier.notify(Signal::SceneGraphChanged);
        assert_eq!(first.try_recv(), Ok(Signal::SceneGraphChanged));
        assert_eq!(second.try_recv(), Ok(Signal::SceneGraphChanged));
        assert!(first.try_recv().is_err());
    }
    #[test]
    fn full_bus_drops() {
        let mut notifier = BusNotifier::new(1);
        let mut reader = notifier.subscribe();
        notifier.notify(Signal::SceneGraphChanged);
        notifier.notify(Signal::HistoryChanged(None));
        assert_eq!(reader.try_recv(), Ok(Signal::SceneGraphChanged));
        assert!(reader.try_recv().is_err());
    }
}
