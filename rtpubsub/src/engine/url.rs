/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Endpoint URL parsing: `<scheme>://<ipv4>:<port>[/path]`.
//!
//! Only numeric IPv4 hosts are accepted; resolving names at setup time would
//! make the endpoint depend on DNS availability.

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::SetupError;

/// Schemes accepted for the UDP transport.
pub const SUPPORTED_SCHEMES: &[&str] = &["opc.udp", "udp"];

/// A parsed publish/subscribe endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointUrl {
    pub addr: SocketAddrV4,
}

impl EndpointUrl {
    /// Parse `url`.
    ///
    /// # Errors
    /// [`SetupError::InvalidUrl`] naming what is wrong.
    pub fn parse(url: &str) -> Result<Self, SetupError> {
        let invalid = |reason: &str| SetupError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| invalid("missing '://'"))?;
        if !SUPPORTED_SCHEMES.contains(&scheme) {
            return Err(invalid(&format!(
                "unsupported scheme '{scheme}' (valid: {})",
                SUPPORTED_SCHEMES.join(", ")
            )));
        }

        let authority = rest.split('/').next().unwrap_or_default();
        let (host, port) = authority
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?;
        let ip: Ipv4Addr = host
            .parse()
            .map_err(|_| invalid(&format!("host '{host}' is not an IPv4 address")))?;
        let port: u16 = port
            .parse()
            .map_err(|_| invalid(&format!("port '{port}' is not a number in 0..=65535")))?;

        Ok(Self {
            addr: SocketAddrV4::new(ip, port),
        })
    }

    pub fn is_multicast(&self) -> bool {
        self.addr.ip().is_multicast()
    }
}

impl std::fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "opc.udp://{}/", self.addr)
    }
}
