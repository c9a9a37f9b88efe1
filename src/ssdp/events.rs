/*!
The event bus: synchronous, single-threaded dispatch to subscriber callbacks,
corresponding to the four observable channels of `spec.md` §4.6
(`datagram_received`, `new_device`, `removed_device`, `log`).

Grounded in the original implementation's `EventDispatcher` mixin (Coherence's
`louie`-based signal dispatch) underlying `SSDPServer`, re-expressed as plain
boxed closures since this crate has no reactor/signal framework to lean on.
*/
use crate::ssdp::registry::DeviceRecord;
use std::net::SocketAddr;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
}

pub type DatagramListener = Box<dyn Fn(&[u8], SocketAddr) + Send>;
pub type DeviceListener = Box<dyn Fn(&DeviceRecord) + Send>;
pub type LogListener = Box<dyn Fn(LogLevel, &str) + Send>;

#[derive(Default)]
struct Channel<F: ?Sized> {
    listeners: Vec<Box<F>>,
}

impl<F: ?Sized> Channel<F> {
    fn new() -> Self {
        Channel {
            listeners: Vec::new(),
        }
    }
}

///
/// Holds one subscriber list per channel. `subscribe` returns a
/// `SubscriptionId` opaque handle; `unsubscribe` removes that one listener,
/// leaving the others on the channel untouched.
///
#[derive(Default)]
pub struct EventBus {
    datagram_received: Channel<dyn Fn(&[u8], SocketAddr) + Send>,
    new_device: Channel<dyn Fn(&DeviceRecord) + Send>,
    removed_device: Channel<dyn Fn(&DeviceRecord) + Send>,
    log: Channel<dyn Fn(LogLevel, &str) + Send>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SubscriptionId {
    channel: EventChannel,
    index: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum EventChannel {
    DatagramReceived,
    NewDevice,
    RemovedDevice,
    Log,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            datagram_received: Channel::new(),
            new_device: Channel::new(),
            removed_device: Channel::new(),
            log: Channel::new(),
        }
    }

    pub fn on_datagram_received(&mut self, listener: DatagramListener) -> SubscriptionId {
        self.datagram_received.listeners.push(listener);
        SubscriptionId {
            channel: EventChannel::DatagramReceived,
            index: self.datagram_received.listeners.len() - 1,
        }
    }

    pub fn on_new_device(&mut self, listener: DeviceListener) -> SubscriptionId {
        self.new_device.listeners.push(listener);
        SubscriptionId {
            channel: EventChannel::NewDevice,
            index: self.new_device.listeners.len() - 1,
        }
    }

    pub fn on_removed_device(&mut self, listener: DeviceListener) -> SubscriptionId {
        self.removed_device.listeners.push(listener);
        SubscriptionId {
            channel: EventChannel::RemovedDevice,
            index: self.removed_device.listeners.len() - 1,
        }
    }

    pub fn on_log(&mut self, listener: LogListener) -> SubscriptionId {
        self.log.listeners.push(listener);
        SubscriptionId {
            channel: EventChannel::Log,
            index: self.log.listeners.len() - 1,
        }
    }

    /// Removes a previously registered listener. Subsequent ids on the same
    /// channel keep their original index (listeners are cleared, not
    /// shifted), so unsubscribing twice is a harmless no-op.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        match id.channel {
            EventChannel::DatagramReceived => {
                if let Some(listener) = self.datagram_received.listeners.get_mut(id.index) {
                    *listener = Box::new(|_, _| {});
                }
            }
            EventChannel::NewDevice => {
                if let Some(listener) = self.new_device.listeners.get_mut(id.index) {
                    *listener = Box::new(|_| {});
                }
            }
            EventChannel::RemovedDevice => {
                if let Some(listener) = self.removed_device.listeners.get_mut(id.index) {
                    *listener = Box::new(|_| {});
                }
            }
            EventChannel::Log => {
                if let Some(listener) = self.log.listeners.get_mut(id.index) {
                    *listener = Box::new(|_, _| {});
                }
            }
        }
    }

    pub fn emit_datagram_received(&self, raw: &[u8], from: SocketAddr) {
        for listener in &self.datagram_received.listeners {
            listener(raw, from);
        }
    }

    pub fn emit_new_device(&self, record: &DeviceRecord) {
        for listener in &self.new_device.listeners {
            listener(record);
        }
    }

    pub fn emit_removed_device(&self, record: &DeviceRecord) {
        for listener in &self.removed_device.listeners {
            listener(record);
        }
    }

    pub fn emit_log(&self, level: LogLevel, message: &str) {
        for listener in &self.log.listeners {
            listener(level, message);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ssdp::registry::Manifestation;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn sample() -> DeviceRecord {
        DeviceRecord {
            usn: "uuid:1::upnp:rootdevice".to_string(),
            notification_type: "upnp:rootdevice".to_string(),
            location: "http://10.0.0.2/desc.xml".to_string(),
            server: "test/1.0 UPnP/1.1 test/1.0".to_string(),
            max_age_secs: 1800,
            host: None,
            manifestation: Manifestation::Local,
            silent: false,
            last_seen_secs: 0,
        }
    }

    #[test]
    fn new_device_listener_is_called() {
        let mut bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        bus.on_new_device(Box::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        bus.emit_new_device(&sample());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let id = bus.on_removed_device(Box::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));
        bus.unsubscribe(id);
        bus.emit_removed_device(&sample());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
