/*!
Builds `NOTIFY` frames for `ssdp:alive` and `ssdp:byebye` advertisements of a
local device.

Grounded in the teacher's `discovery::notify::device_available`/
`device_unavailable`, which build a `RequestBuilder` with headers added in a
fixed sequence, and in `original_source/ssdp.py::doNotify`/`doByebye` for the
exact header set used for each — both carry the same field set (`HOST`,
`CACHE-CONTROL`, `EXT`, `LOCATION`, `NT`, `NTS`, `SERVER`, `USN`), differing
only in `NTS`'s value, since a control point answering a `byebye` still needs
`LOCATION`/`SERVER` to identify which device just left.
*/
use crate::ssdp::codec::{Command, Frame};
use crate::ssdp::registry::DeviceRecord;
use crate::syntax::*;

/// Builds the `ssdp:alive` frame for `record`, multicast to the whole group.
pub fn build_alive(record: &DeviceRecord, multicast_host: &str) -> Frame {
    build_notify(record, multicast_host, NTS_ALIVE)
}

/// Builds the `ssdp:byebye` frame for `record`.
pub fn build_byebye(record: &DeviceRecord, multicast_host: &str) -> Frame {
    build_notify(record, multicast_host, NTS_BYE)
}

fn build_notify(record: &DeviceRecord, multicast_host: &str, nts: &str) -> Frame {
    let mut frame = Frame::new(Command::Notify);
    frame
        .add_header(HTTP_HEADER_HOST, multicast_host)
        .add_header(
            HTTP_HEADER_CACHE_CONTROL,
            format!("max-age={}", record.max_age_secs),
        )
        .add_header(HTTP_HEADER_EXT, "")
        .add_header(HTTP_HEADER_LOCATION, record.location.clone())
        .add_header(HTTP_HEADER_NT, record.notification_type.clone())
        .add_header(HTTP_HEADER_NTS, nts)
        .add_header(HTTP_HEADER_SERVER, record.server.clone())
        .add_header(HTTP_HEADER_USN, record.usn.clone());
    frame
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ssdp::registry::Manifestation;
    use pretty_assertions::assert_eq;

    fn local() -> DeviceRecord {
        DeviceRecord {
            usn: "uuid:1::upnp:rootdevice".to_string(),
            notification_type: "upnp:rootdevice".to_string(),
            location: "http://192.168.1.9:8080/desc.xml".to_string(),
            server: "test/1.0 UPnP/1.1 test/1.0".to_string(),
            max_age_secs: 1800,
            host: None,
            manifestation: Manifestation::Local,
            silent: false,
            last_seen_secs: 0,
        }
    }

    #[test]
    fn alive_carries_location_and_lease() {
        let frame = build_alive(&local(), "239.255.255.250:1900");
        assert_eq!(frame.header(HTTP_HEADER_NTS), Some(NTS_ALIVE));
        assert_eq!(frame.header(HTTP_HEADER_CACHE_CONTROL), Some("max-age=1800"));
        assert_eq!(
            frame.header(HTTP_HEADER_LOCATION),
            Some("http://192.168.1.9:8080/desc.xml")
        );
    }

    #[test]
    fn byebye_carries_the_same_field_set_as_alive() {
        let frame = build_byebye(&local(), "239.255.255.250:1900");
        assert_eq!(frame.header(HTTP_HEADER_NTS), Some(NTS_BYE));
        assert_eq!(frame.header(HTTP_HEADER_CACHE_CONTROL), Some("max-age=1800"));
        assert_eq!(
            frame.header(HTTP_HEADER_LOCATION),
            Some("http://192.168.1.9:8080/desc.xml")
        );
        assert_eq!(frame.header(HTTP_HEADER_EXT), Some(""));
    }

    #[test]
    fn alive_carries_ext_header() {
        let frame = build_alive(&local(), "239.255.255.250:1900");
        assert_eq!(frame.header(HTTP_HEADER_EXT), Some(""));
    }
}
