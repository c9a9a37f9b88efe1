/*!
The device registry: the set of local advertisements this engine owns plus
the remote advertisements it has learned about, keyed by USN.

Grounded in `original_source/ssdp.py`'s `known` dict and its `register`,
`unRegister`, `isKnown`, `notifyReceived`, and `check_valid` methods. The
`+30s` grace period and the `max-age=N` lease arithmetic are taken directly
from `check_valid`'s `last_seen + expiry + 30 < now` comparison.
*/
use crate::syntax::ST_ROOT_DEVICE;
use std::collections::HashMap;
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// Public Values
// ------------------------------------------------------------------------------------------------

/// Grace period added to a remote entry's advertised lease before it is
/// considered expired, taken verbatim from the original implementation.
pub const EXPIRY_GRACE_SECS: u64 = 30;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Manifestation {
    /// Owned by this engine; never expires and is re-announced by the
    /// scheduler.
    Local,
    /// Learned from the network; subject to lease expiry.
    Remote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceRecord {
    pub usn: String,
    pub notification_type: String,
    pub location: String,
    pub server: String,
    pub max_age_secs: u64,
    pub host: Option<String>,
    pub manifestation: Manifestation,
    pub silent: bool,
    pub last_seen_secs: u64,
}

impl DeviceRecord {
    pub fn is_expired(&self, now_secs: u64) -> bool {
        match self.manifestation {
            Manifestation::Local => false,
            Manifestation::Remote => {
                self.last_seen_secs + self.max_age_secs + EXPIRY_GRACE_SECS < now_secs
            }
        }
    }
}

///
/// The registry proper: a `HashMap` keyed by USN, exactly as the original
/// Python implementation's flat `known` dict, plus the bookkeeping needed to
/// project just the local root devices (used when building announcements).
///
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<String, DeviceRecord>,
    /// USNs of entries with `st == upnp:rootdevice`, in insertion order —
    /// the projection `spec.md` §4.3 calls `root_devices`.
    root_device_order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            entries: HashMap::new(),
            root_device_order: Vec::new(),
        }
    }

    /// Inserts or replaces the entry for `record.usn`. Returns the prior
    /// value, if any, so callers can tell a fresh registration from a
    /// refresh (used to decide whether to emit `new_device`).
    pub fn upsert(&mut self, record: DeviceRecord) -> Option<DeviceRecord> {
        if record.notification_type == ST_ROOT_DEVICE && !self.root_device_order.contains(&record.usn) {
            self.root_device_order.push(record.usn.clone());
        }
        self.entries.insert(record.usn.clone(), record)
    }

    pub fn remove(&mut self, usn: &str) -> Option<DeviceRecord> {
        self.root_device_order.retain(|existing| existing != usn);
        self.entries.remove(usn)
    }

    pub fn get(&self, usn: &str) -> Option<&DeviceRecord> {
        self.entries.get(usn)
    }

    pub fn is_known(&self, usn: &str) -> bool {
        self.entries.contains_key(usn)
    }

    /// Updates `last_seen_secs` and `max_age_secs` on an existing remote
    /// entry, corresponding to a repeated `ssdp:alive` for a USN already
    /// known (`notifyReceived`'s "already seen" branch).
    pub fn touch(&mut self, usn: &str, now_secs: u64, max_age_secs: u64) -> bool {
        if let Some(record) = self.entries.get_mut(usn) {
            record.last_seen_secs = now_secs;
            record.max_age_secs = max_age_secs;
            true
        } else {
            false
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.entries.values()
    }

    pub fn local_entries(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.entries
            .values()
            .filter(|r| r.manifestation == Manifestation::Local)
    }

    /// The ordered `root_devices` projection: every entry with
    /// `st == upnp:rootdevice`, in the order each was first registered.
    pub fn root_devices(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.root_device_order
            .iter()
            .filter_map(move |usn| self.entries.get(usn))
    }

    /// Sweeps expired remote entries, removing and returning them so the
    /// caller can emit `removed_device` for each.
    pub fn sweep_expired(&mut self, now_secs: u64) -> Vec<DeviceRecord> {
        let expired: Vec<String> = self
            .entries
            .values()
            .filter(|r| r.is_expired(now_secs))
            .map(|r| r.usn.clone())
            .collect();
        expired.into_iter().filter_map(|usn| self.remove(&usn)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses the `max-age=N` directive out of a `CACHE-CONTROL` header value,
/// by splitting on `=` and parsing the tail as an integer — the same
/// algorithm as the Python original, deliberately not a regex.
pub fn parse_max_age(cache_control: &str) -> Option<u64> {
    cache_control
        .split(';')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|tail| tail.trim().parse::<u64>().ok())
}

pub fn now_secs(now: Duration) -> u64 {
    now.as_secs()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn remote(usn: &str, last_seen: u64, max_age: u64) -> DeviceRecord {
        DeviceRecord {
            usn: usn.to_string(),
            notification_type: "upnp:rootdevice".to_string(),
            location: "http://10.0.0.2/desc.xml".to_string(),
            server: "test/1.0 UPnP/1.1 test/1.0".to_string(),
            max_age_secs: max_age,
            host: Some("10.0.0.2".to_string()),
            manifestation: Manifestation::Remote,
            silent: false,
            last_seen_secs: last_seen,
        }
    }

    #[test]
    fn parses_max_age() {
        assert_eq!(parse_max_age("max-age=1800"), Some(1800));
        assert_eq!(parse_max_age("no-cache"), None);
        assert_eq!(parse_max_age("max-age=10"), Some(10));
    }

    #[test]
    fn remote_expires_after_grace_period() {
        let mut reg = Registry::new();
        reg.upsert(remote("uuid:1::upnp:rootdevice", 0, 10));
        assert!(!reg.get("uuid:1::upnp:rootdevice").unwrap().is_expired(40));
        assert!(reg.get("uuid:1::upnp:rootdevice").unwrap().is_expired(41));
    }

    #[test]
    fn sweep_removes_only_expired() {
        let mut reg = Registry::new();
        reg.upsert(remote("uuid:1::upnp:rootdevice", 0, 10));
        reg.upsert(remote("uuid:2::upnp:rootdevice", 40, 10));
        let removed = reg.sweep_expired(41);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].usn, "uuid:1::upnp:rootdevice");
        assert!(reg.is_known("uuid:2::upnp:rootdevice"));
    }

    #[test]
    fn root_devices_preserves_insertion_order_and_drops_removed() {
        let mut reg = Registry::new();
        reg.upsert(remote("uuid:2::upnp:rootdevice", 0, 1800));
        reg.upsert(remote("uuid:1::upnp:rootdevice", 0, 1800));
        let mut service = remote("uuid:2::urn:schemas:service:foo", 0, 1800);
        service.notification_type = "urn:schemas:service:foo".to_string();
        reg.upsert(service);
        assert_eq!(
            reg.root_devices().map(|r| r.usn.as_str()).collect::<Vec<_>>(),
            vec!["uuid:2::upnp:rootdevice", "uuid:1::upnp:rootdevice"]
        );
        reg.remove("uuid:2::upnp:rootdevice");
        assert_eq!(
            reg.root_devices().map(|r| r.usn.as_str()).collect::<Vec<_>>(),
            vec!["uuid:1::upnp:rootdevice"]
        );
    }

    #[test]
    fn local_entries_never_expire() {
        let mut reg = Registry::new();
        let mut local = remote("uuid:3::upnp:rootdevice", 0, 10);
        local.manifestation = Manifestation::Local;
        reg.upsert(local);
        assert!(!reg.get("uuid:3::upnp:rootdevice").unwrap().is_expired(u64::MAX));
    }
}
