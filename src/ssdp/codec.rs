/*!
The SSDP wire codec: parsing and serializing the HTTP-over-UDP frames used by
`NOTIFY`, `M-SEARCH`, and search responses.

Grounded in `original_source/ssdp.py::datagramReceived`, which splits the raw
datagram on `"\r\n\r\n"`, takes the first line as the request/status line, and
splits each remaining line on the first `:` — passing both the header name
and its value through `fix_string` (which strips any run of leading/trailing
`'` or `"` characters) and lowercasing the name. The header-assembly order
mirrors the teacher's `discovery::notify` `RequestBuilder::add_header`
chains.
*/
use crate::error::{parse_error, Error};
use crate::syntax::*;
use std::fmt::Write as _;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// The three shapes of frame this codec ever sees.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Notify,
    Search,
    /// A unicast response to an `M-SEARCH` (`HTTP/1.1 200 OK` status line).
    Response,
}

///
/// A parsed or to-be-serialized SSDP datagram: a request/status line plus an
/// ordered list of headers. Header lookup is case-insensitive, per HTTP, but
/// insertion order is preserved for serialization.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    pub command: Command,
    headers: Vec<(String, String)>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Frame {
    pub fn new(command: Command) -> Self {
        Frame {
            command,
            headers: Vec::new(),
        }
    }

    pub fn add_header<S: Into<String>>(&mut self, name: &str, value: S) -> &mut Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes to the exact byte sequence sent on the wire: request/status
    /// line, each header as `NAME: value`, terminated `\r\n\r\n`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = String::new();
        let start_line = match self.command {
            Command::Notify => format!("{} {}{}", HTTP_METHOD_NOTIFY, HTTP_MATCH_ANY_RESOURCE, " HTTP/1.1"),
            Command::Search => format!("{} {}{}", HTTP_METHOD_SEARCH, HTTP_MATCH_ANY_RESOURCE, " HTTP/1.1"),
            Command::Response => HTTP_STATUS_OK.to_string(),
        };
        out.push_str(&start_line);
        out.push_str(HTTP_HEADER_LINE_SEP);
        for (name, value) in &self.headers {
            let _ = write!(out, "{}{} {}", name, HTTP_HEADER_SEP, value);
            out.push_str(HTTP_HEADER_LINE_SEP);
        }
        out.push_str(HTTP_HEADER_LINE_SEP);
        out.into_bytes()
    }

    ///
    /// Parses a raw datagram. Unlike the engine's inbound pipeline (which
    /// logs and silently drops malformed input), this returns `Err` so that
    /// direct callers — principally tests — can assert on malformed input.
    ///
    pub fn parse(raw: &[u8]) -> Result<Frame, Error> {
        let text = std::str::from_utf8(raw).map_err(|e| parse_error(e.to_string()))?;
        let mut lines = text.split(HTTP_HEADER_LINE_SEP);
        let start_line = lines
            .next()
            .ok_or_else(|| parse_error("empty datagram"))?
            .trim();
        if start_line.is_empty() {
            return Err(parse_error("empty start line"));
        }

        let command = if start_line.starts_with(HTTP_METHOD_NOTIFY) {
            Command::Notify
        } else if start_line.starts_with(HTTP_METHOD_SEARCH) {
            Command::Search
        } else if start_line.starts_with("HTTP/") {
            Command::Response
        } else {
            return Err(parse_error(format!("unrecognized start line: {}", start_line)));
        };

        let mut frame = Frame::new(command);
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, HTTP_HEADER_SEP);
            let name = fix_string(parts.next().unwrap_or("").trim()).to_lowercase();
            let value = fix_string(parts.next().unwrap_or("").trim());
            if name.is_empty() {
                continue;
            }
            frame.add_header(&name, value);
        }
        Ok(frame)
    }
}

/// The original's `fix_string`: strips any run of leading/trailing `'` or
/// `"` characters. Applied to both header name and value — a header like
/// `MAN: "ssdp:discover"` arrives quoted, and some control points also quote
/// the header name itself.
fn fix_string(value: &str) -> String {
    value.trim_matches(|c| c == '\'' || c == '"').to_string()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_notify_alive() {
        let mut frame = Frame::new(Command::Notify);
        frame
            .add_header(HTTP_HEADER_HOST, "239.255.255.250:1900")
            .add_header(HTTP_HEADER_CACHE_CONTROL, "max-age=1800")
            .add_header(HTTP_HEADER_LOCATION, "http://192.168.1.2:80/desc.xml")
            .add_header(HTTP_HEADER_NT, "upnp:rootdevice")
            .add_header(HTTP_HEADER_NTS, NTS_ALIVE)
            .add_header(HTTP_HEADER_USN, "uuid:abc::upnp:rootdevice");

        let wire = frame.serialize();
        let parsed = Frame::parse(&wire).expect("parses");
        assert_eq!(parsed.command, Command::Notify);
        assert_eq!(parsed.header(HTTP_HEADER_USN), Some("uuid:abc::upnp:rootdevice"));
        assert_eq!(parsed.header(HTTP_HEADER_NTS), Some(NTS_ALIVE));
    }

    #[test]
    fn dequotes_man_header() {
        let raw = format!(
            "M-SEARCH * HTTP/1.1{sep}MAN: {ext}{sep}MX: 3{sep}ST: ssdp:all{sep}{sep}",
            sep = HTTP_HEADER_LINE_SEP,
            ext = HTTP_EXTENSION
        );
        let parsed = Frame::parse(raw.as_bytes()).expect("parses");
        assert_eq!(parsed.header(HTTP_HEADER_MAN), Some("ssdp:discover"));
    }

    #[test]
    fn strips_any_run_of_either_quote_character_from_name_and_value() {
        let raw = format!(
            "M-SEARCH * HTTP/1.1{sep}'''ST''': \"'upnp:rootdevice'\"{sep}{sep}",
            sep = HTTP_HEADER_LINE_SEP
        );
        let parsed = Frame::parse(raw.as_bytes()).expect("parses");
        assert_eq!(parsed.header(HTTP_HEADER_ST), Some("upnp:rootdevice"));
    }

    #[test]
    fn rejects_unrecognized_start_line() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        assert!(Frame::parse(raw).is_err());
    }

    #[test]
    fn rejects_empty_datagram() {
        assert!(Frame::parse(b"").is_err());
    }
}
