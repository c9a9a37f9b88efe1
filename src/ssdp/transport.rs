/*!
Datagram transport: binds the multicast sockets, sends and receives raw
frames, and implements the IPv6 "companion socket" workaround.

Grounded in `original_source/ssdp.py::__init__`/`listen_dummy`/`send_it`/
`shutdown`. The original (Twisted) in IPv4 mode joins the SSDP group
directly via `reactor.listenMulticast` and both sends and receives on that
one socket. In IPv6 mode it instead binds the primary socket to the
wildcard address on the SSDP port (a socket bound to a link-local or
site-local address cannot itself join the site-local group on most stacks)
and opens a second raw socket bound to the interface's link-local address,
joins the site-local group (`ff05::c`) on it via `IPV6_JOIN_GROUP`, sets it
as the multicast-out interface, and drains it on its own reactor
registration (`listen_dummy`) purely to keep the membership alive — the
primary socket sees the same inbound traffic because both are bound to the
same port. `send_it` sends through both sockets. This module keeps that
shape: `Config::ipv6` selects which stack the primary `UdpSocket` binds as
(IPv4-exclusive or IPv6-exclusive, never both at once), and in IPv6 mode an
additional companion `socket2::Socket` is stood up, drained by a dedicated
thread that forwards what it reads back to the main pump over a channel and
is also sent to whenever the engine sends a multicast frame — torn down by
shutting down its read half, the same tactic as the original's
`dummy_socket.shutdown(SHUT_RD)`.
*/
use crate::error::Error;
use crate::syntax::{MULTICAST_ADDRESS, MULTICAST_ADDRESS6, MULTICAST_PORT};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

///
/// Abstraction over "a socket that can send SSDP frames and receive
/// datagrams with a bounded wait". Implemented by `UdpTransport` for
/// production use and by `MemoryTransport` for tests that want to assert on
/// emitted datagrams without binding real sockets (`Config::test = true`).
///
pub trait Transport: Send {
    fn send_to(&self, frame: &[u8], addr: SocketAddr) -> std::io::Result<()>;
    fn send_multicast_v4(&self, frame: &[u8]) -> std::io::Result<()>;
    fn send_multicast_v6(&self, frame: &[u8]) -> std::io::Result<()>;
    /// Waits up to `timeout` for a datagram from either the primary socket
    /// or the IPv6 companion drain thread. Returns `Ok(None)` on timeout.
    fn recv(&self, timeout: Duration) -> std::io::Result<Option<(Vec<u8>, SocketAddr)>>;
    fn shutdown(&self);
    /// Lets tests downcast a `Box<dyn Transport>` back to `MemoryTransport`
    /// to inject datagrams and inspect what was sent.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Which stack a `UdpTransport` binds: exactly one of IPv4 or IPv6, never
/// both — `Config::ipv6` selects the stack, it does not add a second one.
pub enum BindMode {
    V4(Ipv4Addr),
    /// `link_local`/`scope_id` identify the interface the companion socket
    /// joins the site-local group on.
    V6 { link_local: Ipv6Addr, scope_id: u32 },
}

/// Production transport: a primary `UdpSocket` plus, in IPv6 mode, a
/// companion socket and its drain thread.
pub struct UdpTransport {
    socket: UdpSocket,
    multicast_v4: Option<SocketAddr>,
    multicast_v6: Option<SocketAddr>,
    companion: Option<CompanionHandle>,
    closed: Arc<AtomicBool>,
}

struct CompanionHandle {
    socket: Arc<Socket>,
    rx: Receiver<(Vec<u8>, SocketAddr)>,
    thread: Option<JoinHandle<()>>,
}

// ------------------------------------------------------------------------------------------------
// Implementations -- UdpTransport
// ------------------------------------------------------------------------------------------------

impl UdpTransport {
    /// Binds the primary socket for `mode` and, in `V6` mode, stands up the
    /// companion socket as well.
    pub fn bind(mode: BindMode) -> Result<Self, Error> {
        match mode {
            BindMode::V4(bind_addr) => {
                let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
                    .map_err(|e| Error::Io(e.to_string()))?;
                socket.set_reuse_address(true).map_err(|e| Error::Io(e.to_string()))?;
                let bind = SocketAddr::new(IpAddr::V4(bind_addr), MULTICAST_PORT);
                socket.bind(&SockAddr::from(bind)).map_err(|e| Error::Io(e.to_string()))?;
                let group: Ipv4Addr = MULTICAST_ADDRESS.parse().expect("valid multicast literal");
                socket
                    .join_multicast_v4(&group, &bind_addr)
                    .map_err(|e| Error::Io(e.to_string()))?;
                let socket: UdpSocket = socket.into();

                Ok(UdpTransport {
                    socket,
                    multicast_v4: Some(SocketAddr::new(IpAddr::V4(group), MULTICAST_PORT)),
                    multicast_v6: None,
                    companion: None,
                    closed: Arc::new(AtomicBool::new(false)),
                })
            }
            BindMode::V6 { link_local, scope_id } => {
                let socket = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))
                    .map_err(|e| Error::Io(e.to_string()))?;
                socket.set_reuse_address(true).map_err(|e| Error::Io(e.to_string()))?;
                let bind = SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), MULTICAST_PORT);
                socket.bind(&SockAddr::from(bind)).map_err(|e| Error::Io(e.to_string()))?;
                let socket: UdpSocket = socket.into();

                let companion = spawn_companion(link_local, scope_id)?;
                let group: Ipv6Addr = MULTICAST_ADDRESS6.parse().expect("valid multicast literal");

                Ok(UdpTransport {
                    socket,
                    multicast_v4: None,
                    multicast_v6: Some(SocketAddr::new(IpAddr::V6(group), MULTICAST_PORT)),
                    companion: Some(companion),
                    closed: Arc::new(AtomicBool::new(false)),
                })
            }
        }
    }
}

fn spawn_companion(addr: Ipv6Addr, scope_id: u32) -> Result<CompanionHandle, Error> {
    let socket = Socket::new(Domain::IPV6, Type::DGRAM, Some(Protocol::UDP))
        .map_err(|e| Error::Io(e.to_string()))?;
    socket.set_reuse_address(true).map_err(|e| Error::Io(e.to_string()))?;
    let bind = SocketAddr::new(IpAddr::V6(addr), MULTICAST_PORT);
    socket.bind(&SockAddr::from(bind)).map_err(|e| Error::Io(e.to_string()))?;
    let group: Ipv6Addr = MULTICAST_ADDRESS6.parse().expect("valid multicast literal");
    socket
        .join_multicast_v6(&group, scope_id)
        .map_err(|e| Error::Io(e.to_string()))?;
    let socket = Arc::new(socket);

    let (tx, rx) = mpsc::channel();
    let drain_socket = socket.clone();
    let thread = std::thread::spawn(move || {
        let mut buf = [std::mem::MaybeUninit::new(0u8); 65536];
        loop {
            match drain_socket.recv_from(&mut buf) {
                Ok((n, from)) => {
                    let bytes: Vec<u8> = buf[..n]
                        .iter()
                        .map(|b| unsafe { b.assume_init() })
                        .collect();
                    let addr = match from.as_socket() {
                        Some(addr) => addr,
                        None => continue,
                    };
                    if tx.send((bytes, addr)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    Ok(CompanionHandle {
        socket,
        rx,
        thread: Some(thread),
    })
}

impl Transport for UdpTransport {
    fn send_to(&self, frame: &[u8], addr: SocketAddr) -> std::io::Result<()> {
        self.socket.send_to(frame, addr)?;
        Ok(())
    }

    fn send_multicast_v4(&self, frame: &[u8]) -> std::io::Result<()> {
        match self.multicast_v4 {
            Some(addr) => {
                self.socket.send_to(frame, addr)?;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Sends via both the primary socket and the companion socket, mirroring
    /// the original's `send_it`: a wildcard-bound primary socket cannot be
    /// relied on to pick the right outbound interface for a site-local
    /// group, so the companion (which has the interface pinned) sends too.
    fn send_multicast_v6(&self, frame: &[u8]) -> std::io::Result<()> {
        let addr = match self.multicast_v6 {
            Some(addr) => addr,
            None => return Ok(()),
        };
        let primary = self.socket.send_to(frame, addr).map(|_| ());
        let companion = match &self.companion {
            Some(companion) => companion.socket.send_to(frame, &SockAddr::from(addr)).map(|_| ()),
            None => Ok(()),
        };
        match (primary, companion) {
            (Ok(()), _) | (_, Ok(())) => Ok(()),
            (Err(err), Err(_)) => Err(err),
        }
    }

    fn recv(&self, timeout: Duration) -> std::io::Result<Option<(Vec<u8>, SocketAddr)>> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(None);
        }
        if let Some(companion) = &self.companion {
            if let Ok(datagram) = companion.rx.try_recv() {
                return Ok(Some(datagram));
            }
        }
        self.socket.set_read_timeout(Some(timeout.max(Duration::from_millis(1))))?;
        let mut buf = [0u8; 65536];
        match self.socket.recv_from(&mut buf) {
            Ok((n, from)) => Ok(Some((buf[..n].to_vec(), from))),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                if let Some(companion) = &self.companion {
                    match companion.rx.recv_timeout(Duration::from_millis(0)) {
                        Ok(datagram) => Ok(Some(datagram)),
                        Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(None),
                    }
                } else {
                    Ok(None)
                }
            }
            Err(e) => Err(e),
        }
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Some(companion) = &self.companion {
            let _ = companion.socket.shutdown(std::net::Shutdown::Both);
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(companion) = &mut self.companion {
            if let Some(thread) = companion.thread.take() {
                let _ = thread.join();
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// In-memory test double
// ------------------------------------------------------------------------------------------------

///
/// A transport double used when `Config::test == true`: `send_*` append to
/// an in-memory log instead of touching real sockets, and `recv` is driven
/// entirely by `inject` — tests feed it the datagrams they want the engine
/// to see.
///
#[derive(Default)]
pub struct MemoryTransport {
    sent: std::sync::Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    inbox: std::sync::Mutex<std::collections::VecDeque<(Vec<u8>, SocketAddr)>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        MemoryTransport::default()
    }

    pub fn inject(&self, frame: &[u8], from: SocketAddr) {
        self.inbox.lock().unwrap().push_back((frame.to_vec(), from));
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for MemoryTransport {
    fn send_to(&self, frame: &[u8], addr: SocketAddr) -> std::io::Result<()> {
        self.sent.lock().unwrap().push((frame.to_vec(), addr));
        Ok(())
    }

    fn send_multicast_v4(&self, frame: &[u8]) -> std::io::Result<()> {
        let addr = SocketAddr::new(
            IpAddr::V4(MULTICAST_ADDRESS.parse().unwrap()),
            MULTICAST_PORT,
        );
        self.send_to(frame, addr)
    }

    fn send_multicast_v6(&self, frame: &[u8]) -> std::io::Result<()> {
        let addr = SocketAddr::new(
            IpAddr::V6(MULTICAST_ADDRESS6.parse().unwrap()),
            MULTICAST_PORT,
        );
        self.send_to(frame, addr)
    }

    fn recv(&self, _timeout: Duration) -> std::io::Result<Option<(Vec<u8>, SocketAddr)>> {
        Ok(self.inbox.lock().unwrap().pop_front())
    }

    fn shutdown(&self) {}

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn memory_transport_records_sent_frames() {
        let transport = MemoryTransport::new();
        transport.send_multicast_v4(b"hello").unwrap();
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, b"hello");
    }

    #[test]
    fn memory_transport_replays_injected_datagrams() {
        let transport = MemoryTransport::new();
        let from: SocketAddr = "10.0.0.5:1900".parse().unwrap();
        transport.inject(b"M-SEARCH", from);
        let received = transport.recv(Duration::from_millis(10)).unwrap();
        assert_eq!(received, Some((b"M-SEARCH".to_vec(), from)));
        assert_eq!(transport.recv(Duration::from_millis(10)).unwrap(), None);
    }
}
