//! Wildcard DNS responder for the admin AP's captive redirect.
//!
//! Answers every A query with the AP's own address and a no-error reply
//! code. Pumped cooperatively from the supervisor tick; `poll_once` keeps
//! the pump non-blocking on a socket with nothing queued.

use core::net::Ipv4Addr;
use core::task::Poll;

use embassy_futures::poll_once;
use embassy_net::udp::UdpSocket;
use log::{debug, info};

const DNS_PORT: u16 = 53;
const PACKET_MAX: usize = 512;
/// Echoed question plus one A record.
const ANSWER_OVERHEAD: usize = 16;

pub(crate) struct CaptiveDns {
    socket: UdpSocket<'static>,
    address: Ipv4Addr,
    running: bool,
}

impl CaptiveDns {
    pub(crate) fn new(socket: UdpSocket<'static>) -> Self {
        Self {
            socket,
            address: Ipv4Addr::UNSPECIFIED,
            running: false,
        }
    }

    pub(crate) fn start(&mut self, address: Ipv4Addr) -> bool {
        if self.running {
            self.socket.close();
            // Stays down if the re-bind fails; `pump` must not touch a
            // closed socket.
            self.running = false;
        }
        if self.socket.bind(DNS_PORT).is_err() {
            return false;
        }
        self.address = address;
        self.running = true;
        info!("captive dns: redirecting to {}", address);
        true
    }

    pub(crate) fn stop(&mut self) {
        if self.running {
            self.socket.close();
            self.running = false;
            info!("captive dns: stopped");
        }
    }

    /// Serves at most one pending query per call.
    pub(crate) fn pump(&mut self) {
        if !self.running {
            return;
        }
        let mut packet = [0u8; PACKET_MAX];
        let received = poll_once(self.socket.recv_from(&mut packet));
        let Poll::Ready(Ok((len, meta))) = received else {
            return;
        };
        let Some(response_len) = build_response(&mut packet, len, self.address) else {
            debug!("captive dns: dropped malformed query");
            return;
        };
        // A pending send only means the tx queue is momentarily full; the
        // client will retry the query anyway.
        let _ = poll_once(self.socket.send_to(&packet[..response_len], meta.endpoint));
    }
}

/// Rewrites the query in place into a response carrying one A record.
fn build_response(packet: &mut [u8; PACKET_MAX], query_len: usize, address: Ipv4Addr) -> Option<usize> {
    if query_len < 12 || query_len + ANSWER_OVERHEAD > PACKET_MAX {
        return None;
    }
    let question_count = u16::from_be_bytes([packet[4], packet[5]]);
    if question_count != 1 {
        return None;
    }

    // QR=1, RD copied, RA=1, RCODE=0 (no error).
    packet[2] = 0x80 | (packet[2] & 0x01);
    packet[3] = 0x80;
    // One answer, no authority/additional records.
    packet[6] = 0;
    packet[7] = 1;
    packet[8] = 0;
    packet[9] = 0;
    packet[10] = 0;
    packet[11] = 0;

    // Walk past the question name.
    let mut offset = 12;
    loop {
        let label_len = *packet.get(offset)? as usize;
        offset += 1;
        if label_len == 0 {
            break;
        }
        offset += label_len;
        if offset >= query_len {
            return None;
        }
    }
    // QTYPE + QCLASS.
    offset += 4;
    if offset > query_len {
        return None;
    }

    let answer = [
        0xC0, 0x0C, // pointer to the question name
        0x00, 0x01, // type A
        0x00, 0x01, // class IN
        0x00, 0x00, 0x00, 0x3C, // 60 s TTL
        0x00, 0x04, // rdlength
        address.octets()[0],
        address.octets()[1],
        address.octets()[2],
        address.octets()[3],
    ];
    packet[offset..offset + answer.len()].copy_from_slice(&answer);
    Some(offset + answer.len())
}
