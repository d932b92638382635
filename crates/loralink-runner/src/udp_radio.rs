//! UDP radio.
//!
//! Stands in for the LoRa transceiver on a host: each datagram is one packet
//! on the air. A transmitted frame goes to every configured peer; anything
//! arriving on the bound socket is a received packet. UDP carries no signal
//! quality, so received packets report none.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use loralink_frame::{HEADER_SIZE, MAX_PAYLOAD_LEN};
use loralink_node::{Radio, RadioError, RadioPacket};
use tracing::{debug, info};

/// Largest UDP payload. A datagram is never cut short, so an over-long one
/// keeps a byte count that disagrees with its length byte.
const RECV_BUFFER_SIZE: usize = 65_536;

/// A [`Radio`] backed by a non-blocking UDP socket.
#[derive(Debug)]
pub struct UdpRadio {
    bind: SocketAddr,
    peers: Vec<SocketAddr>,
    socket: Option<UdpSocket>,
    buffer: Vec<u8>,
}

impl UdpRadio {
    pub fn new(bind: SocketAddr, peers: Vec<SocketAddr>) -> Self {
        UdpRadio {
            bind,
            peers,
            socket: None,
            buffer: vec![0; RECV_BUFFER_SIZE],
        }
    }

    /// Add a node that hears our transmissions.
    pub fn add_peer(&mut self, peer: SocketAddr) {
        if !self.peers.contains(&peer) {
            self.peers.push(peer);
        }
    }

    pub fn peers(&self) -> &[SocketAddr] {
        &self.peers
    }

    /// Bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}

impl Radio for UdpRadio {
    fn begin(&mut self, frequency_hz: u64) -> Result<(), RadioError> {
        let socket = UdpSocket::bind(self.bind)
            .map_err(|e| RadioError::init(format!("cannot bind {}: {}", self.bind, e)))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| RadioError::init(format!("cannot make socket non-blocking: {}", e)))?;

        info!(
            bind = %socket.local_addr().unwrap_or(self.bind),
            peers = self.peers.len(),
            frequency_hz,
            "UDP radio up"
        );
        self.socket = Some(socket);
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<RadioPacket>, RadioError> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| RadioError::Receive("radio not started".to_string()))?;
        match socket.recv_from(&mut self.buffer) {
            Ok((len, from)) => {
                debug!(%from, len, "datagram received");
                Ok(Some(RadioPacket::new(self.buffer[..len].to_vec(), None)))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(RadioError::Io(e)),
        }
    }

    fn transmit(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if frame.len() > HEADER_SIZE + MAX_PAYLOAD_LEN {
            return Err(RadioError::transmit(format!("frame of {} bytes exceeds packet size", frame.len())));
        }
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| RadioError::transmit("radio not started"))?;
        for peer in &self.peers {
            socket.send_to(frame, peer)?;
        }
        Ok(())
    }
}
