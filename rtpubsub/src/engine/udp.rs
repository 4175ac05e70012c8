/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! UDP messaging engine.
//!
//! | Role | Socket | Per-cycle step |
//! |---|---|---|
//! | publisher | bound to `interface:0`, sends to the endpoint | one frame with the current value |
//! | subscriber | bound to the endpoint port, joins the group if multicast | at most one frame, non-blocking |
//!
//! Both roles own a [`StatusServer`] on the server port as their management
//! workload.

use std::io;
use std::mem;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::os::fd::AsRawFd;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::frame::{Frame, StreamId, FRAME_LEN};
use super::status::StatusServer;
use super::url::EndpointUrl;
use super::{EngineServer, ReaderGroup, WriterGroup};
use crate::error::{EngineError, SetupError};
use crate::shared::{MonitoredValue, RunningFlag};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Where the engine talks: the five-argument command line minus the loop
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointConfig {
    /// IPv4 address of the local network interface.
    pub interface: Ipv4Addr,
    pub url: EndpointUrl,
    /// Status server port.
    pub server_port: u16,
}

/// Socket tuning and stream identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    pub socket_priority: u32,
    pub type_of_service: u8,
    pub stream: StreamId,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            socket_priority: 7,
            // IPTOS_MINCOST | IPTOS_RELIABILITY | IPTOS_THROUGHPUT
            type_of_service: 0x0E,
            stream: StreamId::default(),
        }
    }
}

/// Parse the interface argument.
///
/// # Errors
/// [`SetupError::InvalidInterface`] if it is not an IPv4 address.
pub fn parse_interface(raw: &str) -> Result<Ipv4Addr, SetupError> {
    raw.parse()
        .map_err(|_| SetupError::InvalidInterface(raw.to_string()))
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Management-side half of a configured engine.
pub struct UdpEngine {
    status: StatusServer,
}

impl UdpEngine {
    /// Configure the publisher side and bind `value` to the writer group.
    ///
    /// # Errors
    /// Any [`SetupError`] from binding or configuring sockets.
    pub fn setup_writer(
        endpoint: &EndpointConfig,
        options: &TransportOptions,
        value: MonitoredValue,
    ) -> Result<(Self, UdpWriterGroup), SetupError> {
        let socket = UdpSocket::bind(SocketAddrV4::new(endpoint.interface, 0))
            .map_err(|source| SetupError::Socket {
                op: "bind publisher socket",
                source,
            })?;
        apply_options(&socket, options)?;
        if endpoint.url.is_multicast() {
            set_multicast_interface(&socket, endpoint.interface)?;
        }

        let step_failures = Arc::new(AtomicU64::new(0));
        let status = StatusServer::bind(
            SocketAddrV4::new(endpoint.interface, endpoint.server_port),
            "publisher",
            value.clone(),
            step_failures.clone(),
        )?;

        info!(
            interface = %endpoint.interface,
            target    = %endpoint.url,
            publisher = options.stream.publisher_id,
            group     = options.stream.writer_group_id,
            writer    = options.stream.dataset_writer_id,
            "writer group ready"
        );

        Ok((
            Self { status },
            UdpWriterGroup {
                socket,
                target: endpoint.url.addr,
                stream: options.stream,
                value,
                step_failures,
            },
        ))
    }

    /// Configure the subscriber side and bind `value` to the reader group.
    ///
    /// # Errors
    /// Any [`SetupError`] from binding, joining or configuring sockets.
    pub fn setup_reader(
        endpoint: &EndpointConfig,
        options: &TransportOptions,
        value: MonitoredValue,
    ) -> Result<(Self, UdpReaderGroup), SetupError> {
        let url = endpoint.url;
        let bind_addr = if url.is_multicast() {
            SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, url.addr.port())
        } else {
            url.addr
        };
        let socket = UdpSocket::bind(bind_addr).map_err(|source| SetupError::Socket {
            op: "bind subscriber socket",
            source,
        })?;
        apply_options(&socket, options)?;
        if url.is_multicast() {
            socket
                .join_multicast_v4(url.addr.ip(), &endpoint.interface)
                .map_err(|source| SetupError::Socket {
                    op: "join multicast group",
                    source,
                })?;
        }
        socket
            .set_nonblocking(true)
            .map_err(|source| SetupError::Socket {
                op: "set subscriber non-blocking",
                source,
            })?;

        let step_failures = Arc::new(AtomicU64::new(0));
        let status = StatusServer::bind(
            SocketAddrV4::new(endpoint.interface, endpoint.server_port),
            "subscriber",
            value.clone(),
            step_failures.clone(),
        )?;

        info!(
            interface = %endpoint.interface,
            endpoint  = %url,
            publisher = options.stream.publisher_id,
            group     = options.stream.writer_group_id,
            writer    = options.stream.dataset_writer_id,
            "reader group ready"
        );

        Ok((
            Self { status },
            UdpReaderGroup {
                socket,
                stream: options.stream,
                value,
                step_failures,
            },
        ))
    }

    pub fn status_addr(&self) -> io::Result<SocketAddr> {
        self.status.local_addr()
    }
}

impl EngineServer for UdpEngine {
    fn serve(&self, running: &RunningFlag) -> Result<(), EngineError> {
        self.status.serve(running)
    }
}

// ── Groups ────────────────────────────────────────────────────────────────────

pub struct UdpWriterGroup {
    socket: UdpSocket,
    target: SocketAddrV4,
    stream: StreamId,
    value: MonitoredValue,
    step_failures: Arc<AtomicU64>,
}

impl UdpWriterGroup {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl WriterGroup for UdpWriterGroup {
    fn publish(&mut self) -> Result<(), EngineError> {
        let frame = Frame {
            stream: self.stream,
            value: self.value.load(),
        };
        match self.socket.send_to(&frame.encode(), self.target) {
            Ok(_) => Ok(()),
            Err(e) => {
                self.step_failures.fetch_add(1, Ordering::Relaxed);
                Err(EngineError::Transport(e))
            }
        }
    }
}

pub struct UdpReaderGroup {
    socket: UdpSocket,
    stream: StreamId,
    value: MonitoredValue,
    step_failures: Arc<AtomicU64>,
}

impl UdpReaderGroup {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    fn receive_one(&mut self) -> Result<(), EngineError> {
        // One byte of slack so oversized datagrams are detected, not truncated.
        let mut buf = [0u8; FRAME_LEN + 1];
        let len = match self.socket.recv_from(&mut buf) {
            Ok((len, _)) => len,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
            Err(e) => return Err(EngineError::Transport(e)),
        };

        let frame = Frame::decode(&buf[..len]).ok_or_else(|| {
            EngineError::Transport(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("datagram of {len} bytes is not a frame"),
            ))
        })?;
        if frame.stream != self.stream {
            debug!(stream = ?frame.stream, "ignoring frame from another stream");
            return Ok(());
        }
        self.value.store(frame.value);
        Ok(())
    }
}

impl ReaderGroup for UdpReaderGroup {
    fn subscribe(&mut self) -> Result<(), EngineError> {
        let result = self.receive_one();
        if result.is_err() {
            self.step_failures.fetch_add(1, Ordering::Relaxed);
        }
        result
    }
}

// ── Socket options ────────────────────────────────────────────────────────────

fn apply_options(socket: &UdpSocket, options: &TransportOptions) -> Result<(), SetupError> {
    #[cfg(target_os = "linux")]
    set_int_option(
        socket,
        libc::SOL_SOCKET,
        libc::SO_PRIORITY,
        options.socket_priority as libc::c_int,
        "set SO_PRIORITY",
    )?;
    set_int_option(
        socket,
        libc::IPPROTO_IP,
        libc::IP_TOS,
        libc::c_int::from(options.type_of_service),
        "set IP_TOS",
    )
}

fn set_multicast_interface(socket: &UdpSocket, interface: Ipv4Addr) -> Result<(), SetupError> {
    let addr = libc::in_addr {
        s_addr: u32::from(interface).to_be(),
    };
    set_option(
        socket,
        libc::IPPROTO_IP,
        libc::IP_MULTICAST_IF,
        &addr,
        "set IP_MULTICAST_IF",
    )
}

fn set_int_option(
    socket: &UdpSocket,
    level: libc::c_int,
    name: libc::c_int,
    value: libc::c_int,
    op: &'static str,
) -> Result<(), SetupError> {
    set_option(socket, level, name, &value, op)
}

fn set_option<T>(
    socket: &UdpSocket,
    level: libc::c_int,
    name: libc::c_int,
    value: &T,
    op: &'static str,
) -> Result<(), SetupError> {
    // SAFETY: `value` points to a live `T` of the length passed, and the
    // descriptor is owned by `socket` for the duration of the call.
    let rc = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            level,
            name,
            value as *const T as *const libc::c_void,
            mem::size_of::<T>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(SetupError::Socket {
            op,
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    fn unprivileged() -> TransportOptions {
        TransportOptions {
            socket_priority: 0,
            ..TransportOptions::default()
        }
    }

    /// Reader on an ephemeral loopback port plus a writer targeting it.
    fn loopback_pair(
        writer_stream: StreamId,
    ) -> (UdpWriterGroup, UdpReaderGroup, MonitoredValue, MonitoredValue) {
        let reader_endpoint = EndpointConfig {
            interface: Ipv4Addr::LOCALHOST,
            url: EndpointUrl::parse("opc.udp://127.0.0.1:0/").unwrap(),
            server_port: 0,
        };
        let observed = MonitoredValue::new(0);
        let (_, reader) =
            UdpEngine::setup_reader(&reader_endpoint, &unprivileged(), observed.clone()).unwrap();
        let SocketAddr::V4(reader_addr) = reader.local_addr().unwrap() else {
            panic!("expected an IPv4 reader");
        };

        let writer_endpoint = EndpointConfig {
            url: EndpointUrl { addr: reader_addr },
            ..reader_endpoint
        };
        let emitted = MonitoredValue::new(0);
        let options = TransportOptions {
            stream: writer_stream,
            ..unprivileged()
        };
        let (_, writer) = UdpEngine::setup_writer(&writer_endpoint, &options, emitted.clone()).unwrap();
        (writer, reader, emitted, observed)
    }

    /// Poll `reader` until `observed` changes or a second passes.
    fn poll_until_changed(reader: &mut UdpReaderGroup, observed: &MonitoredValue, from: u64) -> u64 {
        let deadline = Instant::now() + Duration::from_secs(1);
        while Instant::now() < deadline {
            reader.subscribe().unwrap();
            if observed.load() != from {
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        observed.load()
    }

    #[test]
    fn default_options_match_documented_values() {
        let opts = TransportOptions::default();
        assert_eq!(opts.socket_priority, 7);
        assert_eq!(opts.type_of_service, 0x0E);
        assert_eq!(opts.stream, StreamId::default());
    }

    #[test]
    fn interface_must_be_ipv4() {
        assert_eq!(parse_interface("127.0.0.1").unwrap(), Ipv4Addr::LOCALHOST);
        assert!(matches!(
            parse_interface("eth0"),
            Err(SetupError::InvalidInterface(_))
        ));
    }

    #[test]
    fn subscribe_without_pending_data_is_not_a_failure() {
        let (_writer, mut reader, _, observed) = loopback_pair(StreamId::default());
        assert!(reader.subscribe().is_ok());
        assert_eq!(observed.load(), 0);
    }

    #[test]
    fn published_value_is_delivered_into_reader_value() {
        let (mut writer, mut reader, emitted, observed) = loopback_pair(StreamId::default());
        emitted.store(41);
        writer.publish().unwrap();
        assert_eq!(poll_until_changed(&mut reader, &observed, 0), 41);
    }

    #[test]
    fn each_step_consumes_a_single_datagram() {
        let (mut writer, mut reader, emitted, observed) = loopback_pair(StreamId::default());
        for v in 1..=3 {
            emitted.store(v);
            writer.publish().unwrap();
        }
        let mut seen = Vec::new();
        let mut last = 0;
        while seen.len() < 3 {
            last = poll_until_changed(&mut reader, &observed, last);
            seen.push(last);
        }
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn frames_from_other_streams_are_ignored() {
        let foreign = StreamId {
            publisher_id: 9,
            ..StreamId::default()
        };
        let (mut writer, mut reader, emitted, observed) = loopback_pair(foreign);
        emitted.store(5);
        writer.publish().unwrap();
        thread::sleep(Duration::from_millis(20));
        for _ in 0..5 {
            reader.subscribe().unwrap();
        }
        assert_eq!(observed.load(), 0);
    }

    #[test]
    fn malformed_datagram_is_a_step_failure() {
        let (_writer, mut reader, _, observed) = loopback_pair(StreamId::default());
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"junk", reader.local_addr().unwrap()).unwrap();

        let deadline = Instant::now() + Duration::from_secs(1);
        let mut failed = false;
        while Instant::now() < deadline && !failed {
            failed = reader.subscribe().is_err();
            thread::sleep(Duration::from_millis(1));
        }
        assert!(failed);
        assert_eq!(reader.step_failures.load(Ordering::Relaxed), 1);
        assert_eq!(observed.load(), 0);
    }

    #[test]
    fn unowned_interface_fails_writer_setup() {
        let endpoint = EndpointConfig {
            // TEST-NET-1, never assigned to a local interface
            interface: Ipv4Addr::new(192, 0, 2, 1),
            url: EndpointUrl::parse("opc.udp://224.0.0.22:4840/").unwrap(),
            server_port: 0,
        };
        let err = UdpEngine::setup_writer(&endpoint, &unprivileged(), MonitoredValue::new(0))
            .err()
            .unwrap();
        assert!(matches!(err, SetupError::Socket { .. }));
    }
}
