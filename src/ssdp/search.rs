/*!
`M-SEARCH` matching and unicast response construction.

Grounded in `original_source/ssdp.py::discoveryRequest`, which matches a
search target against a known entry by exact string equality or the
`ssdp:all` wildcard, and builds the response with `doNotify`'s sibling
header set. `silent` only suppresses a `ssdp:all` match — a control point
searching for a silent entry's exact `st` still gets an answer, mirroring
`discoveryRequest`'s branch where the wildcard loop skips silent entries but
the exact-match lookup does not consult `silent` at all. One deliberate
divergence from the original, recorded as a Design Note decision
(`spec.md` §9 Open Question):
the original's search response omits the `ST` header entirely, relying on
the control point to infer the target from context; this engine includes
`ST` explicitly, since the UPnP 1.1 spec and the teacher's own
`discovery::notify` module both treat it as required on a response.
*/
use crate::ssdp::codec::{Command, Frame};
use crate::ssdp::registry::DeviceRecord;
use crate::syntax::*;

/// Returns true if `record` should answer a search for `search_target`.
/// `silent` entries are excluded from the `ssdp:all` wildcard but still
/// answer a search naming their exact `st`.
pub fn matches(search_target: &str, record: &DeviceRecord) -> bool {
    if search_target == ST_ALL {
        !record.silent
    } else {
        search_target == record.notification_type
    }
}

/// Builds the unicast `HTTP/1.1 200 OK` response for `record` answering
/// `search_target` (which may differ from `record.notification_type` only
/// when it is `ssdp:all`).
pub fn build_response(record: &DeviceRecord, search_target: &str, date: &str) -> Frame {
    let mut frame = Frame::new(Command::Response);
    frame
        .add_header(
            HTTP_HEADER_CACHE_CONTROL,
            format!("max-age={}", record.max_age_secs),
        )
        .add_header(HTTP_HEADER_DATE, date)
        .add_header(HTTP_HEADER_EXT, "")
        .add_header(HTTP_HEADER_LOCATION, record.location.clone())
        .add_header(HTTP_HEADER_SERVER, record.server.clone())
        .add_header(HTTP_HEADER_ST, search_target)
        .add_header(HTTP_HEADER_USN, record.usn.clone());
    frame
}
