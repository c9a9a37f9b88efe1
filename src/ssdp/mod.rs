/*!
The SSDP engine: wires the transport, codec, registry, scheduler, and event
bus together into the single-threaded cooperative loop described in
`spec.md` §4.5 and §5, and exposes the small control API of §4.6.

Grounded throughout in `original_source/ssdp.py::SSDPServer`, whose methods
(`register`, `unRegister`, `isKnown`, `notifyReceived`, `discoveryRequest`,
`resendNotify`, `check_valid`, `shutdown`) map directly onto the methods
below.
*/
pub mod codec;
pub mod events;
pub mod notify;
pub mod registry;
pub mod scheduler;
pub mod search;
pub mod transport;

use crate::clock::Clock;
use crate::error::{config_error, Error};
use crate::random::Random;
use crate::syntax::{HTTP_HEADER_HOST, HTTP_HEADER_MX, HTTP_HEADER_NT, HTTP_HEADER_NTS, HTTP_HEADER_ST, HTTP_HEADER_USN, MULTICAST_ADDRESS, MULTICAST_ADDRESS6, MULTICAST_PORT, NTS_ALIVE, NTS_BYE, ST_ROOT_DEVICE};
use codec::{Command, Frame};
use events::{DatagramListener, DeviceListener, EventBus, LogLevel, LogListener, SubscriptionId};
use registry::{parse_max_age, DeviceRecord, Manifestation, Registry};
use scheduler::{Scheduler, Task};
use std::net::{Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use transport::{BindMode, MemoryTransport, Transport, UdpTransport};

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// Construction-time configuration, per `spec.md` §6: whether to run against
/// the in-memory test transport, which local interface to bind, and which
/// multicast stack to run. `ipv6` selects the stack; it does not add a
/// second one on top of IPv4.
///
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// When true, the engine uses `MemoryTransport` instead of binding real
    /// sockets, so tests can inject and inspect datagrams directly.
    pub test: bool,
    /// Name of the network interface to bind to; `None` selects the first
    /// usable interface with an address on the selected stack.
    pub interface: Option<String>,
    /// When true, run IPv6-exclusive: bind the primary socket on the
    /// wildcard address, stand up the IPv6 companion socket on the
    /// interface's link-local address, and send/receive only site-local
    /// traffic. When false, run IPv4-exclusive.
    pub ipv6: bool,
}

///
/// Everything the engine needs to advertise a device, supplied by callers of
/// `register` — `spec.md` §3's `DeviceRecord` minus the fields the engine
/// itself derives (`manifestation`, `last_seen`).
///
#[derive(Clone, Debug)]
pub struct Advertisement {
    pub usn: String,
    pub notification_type: String,
    pub location: String,
    pub server: String,
    pub max_age_secs: u64,
    pub silent: bool,
    /// The device's own address. In IPv6 mode this must parse as an IPv6
    /// literal or `register` soft-rejects the call (`spec.md` §7).
    pub host: String,
}

pub struct Engine {
    registry: Registry,
    scheduler: Scheduler,
    events: EventBus,
    transport: Box<dyn Transport>,
    clock: Arc<dyn Clock>,
    random: Arc<dyn Random>,
    ipv6: bool,
    shutting_down: bool,
    pending_responses: Vec<(u64, DeviceRecord, String, SocketAddr)>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Engine {
    pub fn new(config: Config, clock: Arc<dyn Clock>, random: Arc<dyn Random>) -> Result<Engine, Error> {
        let transport: Box<dyn Transport> = if config.test {
            Box::new(MemoryTransport::new())
        } else if config.ipv6 {
            let link_local = crate::common::interface::ipv6_link_local_addresses()
                .into_iter()
                .find(|ip| match &config.interface {
                    Some(name) => name == &ip.name,
                    None => true,
                })
                .ok_or_else(|| config_error("no IPv6 link-local address found for ipv6 mode"))?;
            let (addr, scope_id) = match link_local.address {
                std::net::IpAddr::V6(v6) => (v6, link_local.index),
                _ => unreachable!(),
            };
            Box::new(UdpTransport::bind(BindMode::V6 {
                link_local: addr,
                scope_id,
            })?)
        } else {
            let bind_addr = match &config.interface {
                Some(name) => crate::common::interface::ipv4_addresses()
                    .into_iter()
                    .find(|ip| &ip.name == name)
                    .map(|ip| match ip.address {
                        std::net::IpAddr::V4(v4) => v4,
                        _ => unreachable!(),
                    })
                    .ok_or_else(|| config_error(format!("no IPv4 address on interface {}", name)))?,
                None => crate::common::interface::first_ipv4_address()
                    .map(|ip| match ip.address {
                        std::net::IpAddr::V4(v4) => v4,
                        _ => unreachable!(),
                    })
                    .ok_or_else(|| config_error("no usable IPv4 interface found"))?,
            };
            Box::new(UdpTransport::bind(BindMode::V4(bind_addr))?)
        };

        info!(ipv6 = config.ipv6, test = config.test, "ssdp engine constructed");
        Ok(Engine {
            registry: Registry::new(),
            scheduler: Scheduler::new(clock.as_ref()),
            events: EventBus::new(),
            transport,
            clock,
            random,
            ipv6: config.ipv6,
            shutting_down: false,
            pending_responses: Vec::new(),
        })
    }

    // ---------------------------------------------------------------------
    // Control API
    // ---------------------------------------------------------------------

    /// Registers a local device, immediately announcing it with
    /// `ssdp:alive` (`original_source/ssdp.py::register` calls `doNotify`
    /// synchronously). Re-registering an already-known USN refreshes its
    /// fields and re-announces, without emitting a duplicate `new_device`.
    /// In IPv6 mode, a `host` that doesn't parse as an IPv6 literal is a
    /// soft reject: logged and otherwise ignored (`spec.md` §7).
    pub fn register(&mut self, advertisement: Advertisement) {
        if self.ipv6 && advertisement.host.parse::<Ipv6Addr>().is_err() {
            warn!(usn = %advertisement.usn, host = %advertisement.host, "rejecting non-IPv6 host while running in ipv6 mode");
            self.events.emit_log(
                LogLevel::Warning,
                &format!("rejecting registration for {}: host {} is not an IPv6 literal", advertisement.usn, advertisement.host),
            );
            return;
        }
        let now = registry::now_secs(self.clock.now());
        let record = DeviceRecord {
            usn: advertisement.usn,
            notification_type: advertisement.notification_type,
            location: advertisement.location,
            server: advertisement.server,
            max_age_secs: advertisement.max_age_secs,
            host: Some(advertisement.host),
            manifestation: Manifestation::Local,
            silent: advertisement.silent,
            last_seen_secs: now,
        };
        let previous = self.registry.upsert(record.clone());
        debug!(usn = %record.usn, "registering local device");
        self.announce_alive(&record);
        if previous.is_none() && record.notification_type == ST_ROOT_DEVICE {
            self.events.emit_new_device(&record);
        }
    }

    /// Unregisters a local device, announcing `ssdp:byebye` first
    /// (`unRegister` calling `doByebye`), then removing it from the
    /// registry and, if it is a root device, emitting `removed_device`.
    pub fn unregister(&mut self, usn: &str) {
        if let Some(record) = self.registry.get(usn).cloned() {
            debug!(usn = %record.usn, "unregistering local device");
            self.announce_byebye(&record);
            self.registry.remove(usn);
            if record.notification_type == ST_ROOT_DEVICE {
                self.events.emit_removed_device(&record);
            }
        }
    }

    pub fn is_known(&self, usn: &str) -> bool {
        self.registry.is_known(usn)
    }

    /// The ordered `root_devices` projection (`spec.md` §4.3): every USN
    /// currently registered with `st == upnp:rootdevice`, local or remote,
    /// in the order each was first seen.
    pub fn root_devices(&self) -> Vec<String> {
        self.registry.root_devices().map(|record| record.usn.clone()).collect()
    }

    pub fn on_datagram_received(&mut self, listener: DatagramListener) -> SubscriptionId {
        self.events.on_datagram_received(listener)
    }

    pub fn on_new_device(&mut self, listener: DeviceListener) -> SubscriptionId {
        self.events.on_new_device(listener)
    }

    pub fn on_removed_device(&mut self, listener: DeviceListener) -> SubscriptionId {
        self.events.on_removed_device(listener)
    }

    pub fn on_log(&mut self, listener: LogListener) -> SubscriptionId {
        self.events.on_log(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }

    /// Announces `ssdp:byebye` for every local device and stops the
    /// transport. Idempotent: a second call is a no-op.
    pub fn shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        self.shutting_down = true;
        info!(count = self.registry.local_entries().count(), "engine shutting down");
        let locals: Vec<DeviceRecord> = self.registry.local_entries().cloned().collect();
        for record in &locals {
            self.announce_byebye(record);
        }
        self.transport.shutdown();
    }

    // ---------------------------------------------------------------------
    // Event loop
    // ---------------------------------------------------------------------

    /// Runs one iteration: waits for either an inbound datagram or the next
    /// due scheduled task, whichever comes first, and handles it. Returns
    /// `false` once `shutdown` has been called and there is no more work to
    /// flush, signaling callers' `run` loops to stop.
    pub fn pump_once(&mut self) -> std::io::Result<bool> {
        if self.shutting_down {
            return Ok(false);
        }
        let now = registry::now_secs(self.clock.now());
        let wait = self
            .scheduler
            .next_due_in(now)
            .unwrap_or(Duration::from_secs(1));

        match self.transport.recv(wait)? {
            Some((raw, from)) => {
                self.events.emit_datagram_received(&raw, from);
                self.handle_inbound(&raw, from);
            }
            None => {
                let now = registry::now_secs(self.clock.now());
                for task in self.scheduler.drain_due(now) {
                    self.handle_due_task(task);
                }
            }
        }
        Ok(true)
    }

    pub fn run(&mut self) -> std::io::Result<()> {
        while self.pump_once()? {}
        Ok(())
    }

    fn handle_due_task(&mut self, task: Task) {
        match task {
            Task::Reannounce => {
                let locals: Vec<DeviceRecord> = self.registry.local_entries().cloned().collect();
                for record in &locals {
                    self.announce_alive(record);
                }
            }
            Task::ValiditySweep => {
                let now = registry::now_secs(self.clock.now());
                for removed in self.registry.sweep_expired(now) {
                    if removed.notification_type == ST_ROOT_DEVICE {
                        self.events.emit_removed_device(&removed);
                    }
                }
            }
            Task::SearchResponse(id) => {
                self.flush_search_response(id);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Inbound pipeline
    // ---------------------------------------------------------------------

    fn handle_inbound(&mut self, raw: &[u8], from: SocketAddr) {
        let frame = match Frame::parse(raw) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(from = %from, error = %err, "dropping malformed datagram");
                self.events.emit_log(LogLevel::Debug, &format!("dropping malformed datagram: {}", err));
                return;
            }
        };
        match frame.command {
            Command::Notify => self.handle_notify(&frame, from),
            Command::Search => self.handle_search(&frame, from),
            Command::Response => {}
        }
    }

    /// Mirrors `notifyReceived`: an `ssdp:alive` upserts a remote entry
    /// (touching `last_seen`/`max_age` if already known, inserting fresh
    /// otherwise, emitting `new_device` only for the latter); an
    /// `ssdp:byebye` for a known USN removes it and emits `removed_device`.
    /// A `byebye` for an unknown USN, or any other `NTS` value, is ignored.
    fn handle_notify(&mut self, frame: &Frame, from: SocketAddr) {
        let usn = match frame.header(HTTP_HEADER_USN) {
            Some(usn) => usn.to_string(),
            None => return,
        };
        let nts = frame.header(HTTP_HEADER_NTS).unwrap_or("");
        let now = registry::now_secs(self.clock.now());

        if nts == NTS_ALIVE {
            let max_age = frame
                .header("CACHE-CONTROL")
                .and_then(parse_max_age)
                .unwrap_or(1800);
            if self.registry.touch(&usn, now, max_age) {
                return;
            }
            let record = DeviceRecord {
                usn: usn.clone(),
                notification_type: frame.header(HTTP_HEADER_NT).unwrap_or_default().to_string(),
                location: frame.header("LOCATION").unwrap_or_default().to_string(),
                server: frame.header("SERVER").unwrap_or_default().to_string(),
                max_age_secs: max_age,
                host: Some(from.ip().to_string()),
                manifestation: Manifestation::Remote,
                silent: false,
                last_seen_secs: now,
            };
            self.registry.upsert(record.clone());
            if record.notification_type == ST_ROOT_DEVICE {
                self.events.emit_new_device(&record);
            }
        } else if nts == NTS_BYE {
            if let Some(record) = self.registry.get(&usn).cloned() {
                if record.manifestation == Manifestation::Remote {
                    self.registry.remove(&usn);
                    if record.notification_type == ST_ROOT_DEVICE {
                        self.events.emit_removed_device(&record);
                    }
                }
            }
        }
    }

    /// Mirrors `discoveryRequest`: validates the `HOST` header, matches the
    /// search target against every non-silent local entry, and schedules a
    /// jittered unicast response for each match (`send_it`'s
    /// `reactor.callLater(random.randint(0, mx), ...)`).
    fn handle_search(&mut self, frame: &Frame, from: SocketAddr) {
        if !self.host_header_is_valid(frame, &from) {
            return;
        }
        let search_target = match frame.header(HTTP_HEADER_ST) {
            Some(st) => st.to_string(),
            None => return,
        };
        let mx: u32 = frame
            .header(HTTP_HEADER_MX)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        let matches: Vec<DeviceRecord> = self
            .registry
            .local_entries()
            .filter(|record| search::matches(&search_target, record))
            .cloned()
            .collect();

        let now = registry::now_secs(self.clock.now());
        for record in matches {
            let delay = self.random.uniform(0, mx) as u64;
            let id = self.scheduler.schedule_search_response(now, delay);
            self.pending_responses.push((id, record, search_target.clone(), from));
        }
    }

    /// Per Design Note (`spec.md` §9 Open Question): the original accepts
    /// any `HOST` value on an IPv4 request (some control points omit or
    /// mis-set it) but, when running in IPv6 mode, requires the header to
    /// name the site-local group — otherwise a link-local multicast loop
    /// between adjacent segments could be mistaken for a genuine search.
    fn host_header_is_valid(&self, frame: &Frame, from: &SocketAddr) -> bool {
        match from {
            SocketAddr::V4(_) => true,
            SocketAddr::V6(_) => {
                if !self.ipv6 {
                    return false;
                }
                match frame.header(HTTP_HEADER_HOST) {
                    Some(host) => host.contains(MULTICAST_ADDRESS6),
                    None => false,
                }
            }
        }
    }

    fn flush_search_response(&mut self, id: u64) {
        if let Some(pos) = self.pending_responses.iter().position(|(pending_id, ..)| *pending_id == id) {
            let (_, record, search_target, from) = self.pending_responses.remove(pos);
            let date = httpdate_now();
            let frame = search::build_response(&record, &search_target, &date);
            if let Err(err) = self.transport.send_to(&frame.serialize(), from) {
                warn!(to = %from, error = %err, "search response send failed");
                self.events.emit_log(LogLevel::Warning, &format!("search response send failed: {}", err));
            }
        }
    }

    fn announce_alive(&mut self, record: &DeviceRecord) {
        let frame = notify::build_alive(record, &self.multicast_host());
        self.send_multicast(&frame);
    }

    fn announce_byebye(&mut self, record: &DeviceRecord) {
        let frame = notify::build_byebye(record, &self.multicast_host());
        self.send_multicast(&frame);
    }

    /// Sends on whichever stack `Config::ipv6` selected. The two stacks are
    /// exclusive, not additive — an IPv6-mode engine never emits IPv4
    /// traffic, matching `Config`'s "select IPv6 stack" semantics.
    fn send_multicast(&mut self, frame: &Frame) {
        let raw = frame.serialize();
        let result = if self.ipv6 {
            self.transport.send_multicast_v6(&raw)
        } else {
            self.transport.send_multicast_v4(&raw)
        };
        if let Err(err) = result {
            self.events.emit_log(LogLevel::Warning, &format!("multicast send failed: {}", err));
        }
    }

    fn multicast_host(&self) -> String {
        if self.ipv6 {
            format!("[{}]:{}", MULTICAST_ADDRESS6, MULTICAST_PORT)
        } else {
            format!("{}:{}", MULTICAST_ADDRESS, MULTICAST_PORT)
        }
    }
}

const WEEKDAYS: [&str; 7] = ["Thu", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Formats an RFC 1123 `DATE` header from the current wall-clock time,
/// using the civil-from-days algorithm rather than pulling in a date crate
/// the rest of this codebase has no other use for.
fn httpdate_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    let days = secs.div_euclid(86_400);
    let time_of_day = secs.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    let weekday = WEEKDAYS[(days.rem_euclid(7)) as usize];
    let hour = time_of_day / 3600;
    let minute = (time_of_day % 3600) / 60;
    let second = time_of_day % 60;
    format!(
        "{}, {:02} {} {} {:02}:{:02}:{:02} GMT",
        weekday, day, MONTHS[(month - 1) as usize], year, hour, minute, second
    )
}

/// Howard Hinnant's `civil_from_days`, converting a day count since the Unix
/// epoch into a (year, month, day) civil date.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as i64;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as i64;
    let year = if month <= 2 { y + 1 } else { y };
    (year, month, day)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::test_support::FakeClock;
    use crate::random::test_support::FakeRandom;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn engine() -> Engine {
        Engine::new(
            Config {
                test: true,
                interface: None,
                ipv6: false,
            },
            Arc::new(FakeClock::at(0)),
            Arc::new(FakeRandom),
        )
        .unwrap()
    }

    fn advertisement() -> Advertisement {
        Advertisement {
            usn: "uuid:1::upnp:rootdevice".to_string(),
            notification_type: "upnp:rootdevice".to_string(),
            location: "http://127.0.0.1:8080/desc.xml".to_string(),
            server: "test/1.0 UPnP/1.1 test/1.0".to_string(),
            max_age_secs: 1800,
            silent: false,
            host: "127.0.0.1".to_string(),
        }
    }

    #[test]
    fn register_is_known_and_announces() {
        let mut engine = engine();
        engine.register(advertisement());
        assert!(engine.is_known("uuid:1::upnp:rootdevice"));
    }

    #[test]
    fn register_then_unregister_then_register_reports_new_device_twice() {
        let mut engine = engine();
        let seen = Arc::new(std::sync::Mutex::new(0u32));
        let seen_clone = seen.clone();
        engine.on_new_device(Box::new(move |_| {
            *seen_clone.lock().unwrap() += 1;
        }));
        engine.register(advertisement());
        engine.unregister("uuid:1::upnp:rootdevice");
        engine.register(advertisement());
        assert_eq!(*seen.lock().unwrap(), 2);
        assert!(engine.is_known("uuid:1::upnp:rootdevice"));
    }

    #[test]
    fn re_registering_known_usn_does_not_duplicate_new_device_event() {
        let mut engine = engine();
        let seen = Arc::new(std::sync::Mutex::new(0u32));
        let seen_clone = seen.clone();
        engine.on_new_device(Box::new(move |_| {
            *seen_clone.lock().unwrap() += 1;
        }));
        engine.register(advertisement());
        engine.register(advertisement());
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn search_response_is_sent_after_its_jittered_delay() {
        let clock = Arc::new(FakeClock::at(0));
        let mut engine = Engine::new(
            Config {
                test: true,
                interface: None,
                ipv6: false,
            },
            clock.clone(),
            Arc::new(FakeRandom),
        )
        .unwrap();
        engine.register(advertisement());

        let mut search = Frame::new(Command::Search);
        search
            .add_header(HTTP_HEADER_HOST, "239.255.255.250:1900")
            .add_header("MAN", "ssdp:discover")
            .add_header(HTTP_HEADER_MX, "3")
            .add_header(HTTP_HEADER_ST, "ssdp:all");
        let from: SocketAddr = "10.0.0.5:1900".parse().unwrap();

        fn memory(engine: &Engine) -> &transport::MemoryTransport {
            engine
                .transport
                .as_any()
                .downcast_ref::<transport::MemoryTransport>()
                .unwrap()
        }

        let sent_before_search = memory(&engine).sent().len();
        memory(&engine).inject(&search.serialize(), from);

        assert!(engine.pump_once().unwrap());
        assert_eq!(
            memory(&engine).sent().len(),
            sent_before_search,
            "response must not be sent before its jitter delay elapses"
        );

        clock.advance(3);
        assert!(engine.pump_once().unwrap());

        let sent = memory(&engine).sent();
        assert_eq!(sent.len(), sent_before_search + 1);
        let (raw, to) = sent.last().unwrap();
        assert_eq!(*to, from);
        let response = Frame::parse(raw).unwrap();
        assert_eq!(response.command, Command::Response);
        assert_eq!(response.header(HTTP_HEADER_USN), Some("uuid:1::upnp:rootdevice"));
    }

    #[test]
    fn non_root_device_registration_does_not_emit_new_device() {
        let mut engine = engine();
        let seen = Arc::new(std::sync::Mutex::new(0u32));
        let seen_clone = seen.clone();
        engine.on_new_device(Box::new(move |_| {
            *seen_clone.lock().unwrap() += 1;
        }));
        let mut service = advertisement();
        service.usn = "uuid:1::urn:schemas:service:foo".to_string();
        service.notification_type = "urn:schemas:service:foo".to_string();
        engine.register(service.clone());
        assert!(engine.is_known(&service.usn));
        assert_eq!(*seen.lock().unwrap(), 0);
        assert!(engine.root_devices().is_empty());
    }

    #[test]
    fn root_devices_reflects_registered_root_device() {
        let mut engine = engine();
        engine.register(advertisement());
        assert_eq!(engine.root_devices(), vec!["uuid:1::upnp:rootdevice".to_string()]);
        engine.unregister("uuid:1::upnp:rootdevice");
        assert!(engine.root_devices().is_empty());
    }

    #[test]
    fn register_rejects_non_ipv6_host_in_ipv6_mode() {
        let mut engine = Engine::new(
            Config {
                test: true,
                interface: None,
                ipv6: true,
            },
            Arc::new(FakeClock::at(0)),
            Arc::new(FakeRandom),
        )
        .unwrap();
        engine.register(advertisement());
        assert!(!engine.is_known("uuid:1::upnp:rootdevice"));
    }

    #[test]
    fn ipv6_mode_sends_only_to_the_v6_multicast_group() {
        let mut engine = Engine::new(
            Config {
                test: true,
                interface: None,
                ipv6: true,
            },
            Arc::new(FakeClock::at(0)),
            Arc::new(FakeRandom),
        )
        .unwrap();
        let mut ad = advertisement();
        ad.host = "fe80::1".to_string();
        engine.register(ad);

        let memory = engine
            .transport
            .as_any()
            .downcast_ref::<transport::MemoryTransport>()
            .unwrap();
        let sent = memory.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.ip().to_string(), MULTICAST_ADDRESS6);
    }

    #[test]
    fn unknown_usn_byebye_is_ignored() {
        let mut engine = engine();
        let mut frame = Frame::new(Command::Notify);
        frame
            .add_header(HTTP_HEADER_NT, "upnp:rootdevice")
            .add_header(HTTP_HEADER_NTS, NTS_BYE)
            .add_header(HTTP_HEADER_USN, "uuid:ghost::upnp:rootdevice");
        let from: SocketAddr = "10.0.0.9:1900".parse().unwrap();
        engine.handle_notify(&frame, from);
        assert!(!engine.is_known("uuid:ghost::upnp:rootdevice"));
    }
}
