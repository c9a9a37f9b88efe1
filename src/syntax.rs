/*!
Wire-level constants for the SSDP dialect of HTTP-over-UDP: multicast
endpoints, header names, methods, and `NTS` values.
*/

// ------------------------------------------------------------------------------------------------
// Public Values -- Network
// ------------------------------------------------------------------------------------------------

/// IPv4 SSDP multicast group, reserved by IANA.
pub const MULTICAST_ADDRESS: &str = "239.255.255.250";

/// IPv6 site-local SSDP multicast group. The link-local group (`ff02::c`)
/// is deliberately not used; see `transport` module notes.
pub const MULTICAST_ADDRESS6: &str = "ff05::c";

/// SSDP well-known port.
pub const MULTICAST_PORT: u16 = 1900;

// ------------------------------------------------------------------------------------------------
// Public Values -- HTTP (core)
// ------------------------------------------------------------------------------------------------

pub const HTTP_HEADER_SEP: &str = ":";

pub const HTTP_HEADER_LINE_SEP: &str = "\r\n";

pub const HTTP_MATCH_ANY_RESOURCE: &str = "*";

pub const HTTP_STATUS_OK: &str = "HTTP/1.1 200 OK";

// ------------------------------------------------------------------------------------------------
// Public Values -- HTTP Methods
// ------------------------------------------------------------------------------------------------

/// From the discovery protocol's Advertisement section.
pub const HTTP_METHOD_NOTIFY: &str = "NOTIFY";

/// From the discovery protocol's Search section.
pub const HTTP_METHOD_SEARCH: &str = "M-SEARCH";

// ------------------------------------------------------------------------------------------------
// Public Values -- Headers
// ------------------------------------------------------------------------------------------------

/// Field value contains the `max-age=` directive advertising the lease.
pub const HTTP_HEADER_CACHE_CONTROL: &str = "CACHE-CONTROL";

/// Field value contains date the response was generated, RFC 1123 format.
pub const HTTP_HEADER_DATE: &str = "DATE";

/// Confirms the `MAN` header was understood; header only, no value.
pub const HTTP_HEADER_EXT: &str = "EXT";

/// Field value contains the SSDP multicast address and port.
pub const HTTP_HEADER_HOST: &str = "HOST";

/// Field value contains a URL for the device description document.
pub const HTTP_HEADER_LOCATION: &str = "LOCATION";

/// Required by the HTTP Extension Framework; must be `"ssdp:discover"`.
pub const HTTP_HEADER_MAN: &str = "MAN";

/// Maximum wait time in seconds; responses are jittered in `[0, MX]`.
pub const HTTP_HEADER_MX: &str = "MX";

/// Field value contains Notification Type (device/service class).
pub const HTTP_HEADER_NT: &str = "NT";

/// Field value contains Notification Sub Type (`ssdp:alive`/`ssdp:byebye`).
pub const HTTP_HEADER_NTS: &str = "NTS";

/// Field value contains Search Target; same semantics as `NT`.
pub const HTTP_HEADER_ST: &str = "ST";

/// Product identifier string.
pub const HTTP_HEADER_SERVER: &str = "SERVER";

/// Unique Service Name; primary key of a device/service advertisement.
pub const HTTP_HEADER_USN: &str = "USN";

/// Required by the HTTP Extension Framework; always `"ssdp:discover"`.
pub const HTTP_EXTENSION: &str = "\"ssdp:discover\"";

// ------------------------------------------------------------------------------------------------
// Public Values -- NTS
// ------------------------------------------------------------------------------------------------

pub const NTS_ALIVE: &str = "ssdp:alive";

pub const NTS_BYE: &str = "ssdp:byebye";

// ------------------------------------------------------------------------------------------------
// Public Values -- Search Targets
// ------------------------------------------------------------------------------------------------

/// The search target that matches every non-silent local entry.
pub const ST_ALL: &str = "ssdp:all";

/// The search/notification target of a UPnP root device.
pub const ST_ROOT_DEVICE: &str = "upnp:rootdevice";
