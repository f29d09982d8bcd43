// Copyright 2025 the arbor developers.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implementation of the blocking I/O provider.

// NOTE: I/O error handling in this provider is generally to exit the
// task: an error in the TCP accept loop ends the server, and an error
// on a TCP connection aborts that connection. The exception is *sends*
// in the UDP receive/send loop, which are logged and ignored, so we
// keep processing incoming messages as long as the receive portion
// continues to work.

use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, error, info};

use crate::buf::BufferPool;
use crate::server::{ReceivedInfo, Response, Server, Transport};

/// A blocking I/O provider.
///
/// This provider uses blocking sockets from the standard library: a
/// configurable number of worker threads share one UDP socket, the
/// calling thread runs the TCP accept loop, and each TCP connection is
/// served by its own thread. UDP workers draw their fixed 512-octet
/// receive and response buffers from a shared [`BufferPool`]; TCP
/// connections allocate growable buffers sized by the 2-octet length
/// prefix framing of [RFC 1035 § 4.2.2].
///
/// [RFC 1035 § 4.2.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.2
pub struct BlockingIoProvider {
    config: BlockingIoConfig,
    tcp_listener: TcpListener,
    udp_socket: UdpSocket,
}

/// Configuration options for the [`BlockingIoProvider`].
#[derive(Clone, Copy, Debug)]
pub struct BlockingIoConfig {
    /// The number of UDP worker threads to run.
    pub udp_workers: usize,
}

impl Default for BlockingIoConfig {
    fn default() -> Self {
        Self { udp_workers: 4 }
    }
}

/// The maximum amount of time a TCP client is allowed to take to send
/// us a full DNS message. If it takes longer, we close the connection
/// to defend against Slowloris-style denial-of-service attacks.
const READ_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

impl BlockingIoProvider {
    /// Creates a new `BlockingIoProvider`. This call binds TCP and UDP
    /// sockets to `addr` in preparation, but does not start serving.
    pub fn bind(config: BlockingIoConfig, addr: SocketAddr) -> io::Result<Self> {
        let tcp_listener = TcpListener::bind(addr)?;
        let udp_socket = UdpSocket::bind(addr)?;
        Ok(Self {
            config,
            tcp_listener,
            udp_socket,
        })
    }

    /// Returns the local address the provider's sockets are bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.tcp_listener.local_addr()
    }

    /// Serves `server` until an I/O error ends the TCP accept loop.
    /// The calling thread becomes the accept loop; UDP workers are
    /// spawned in the background.
    pub fn serve(self, server: Arc<Server>) -> io::Result<()> {
        let pool = Arc::new(BufferPool::new(2 * self.config.udp_workers));

        for i in 0..self.config.udp_workers {
            let server = server.clone();
            let socket = self.udp_socket.try_clone()?;
            let pool = pool.clone();
            thread::Builder::new()
                .name(format!("udp worker {}", i))
                .spawn(move || {
                    log_io_errors(run_udp_worker(&server, &socket, &pool));
                })?;
        }
        info!(
            "serving on {} ({} UDP workers)",
            self.tcp_listener.local_addr()?,
            self.config.udp_workers
        );

        loop {
            let (socket, peer) = match self.tcp_listener.accept() {
                Ok(accepted) => accepted,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let server = server.clone();
            thread::Builder::new()
                .name(format!("tcp {}", peer))
                .spawn(move || {
                    log_io_errors(handle_tcp_connection(&server, socket, peer.ip()));
                })?;
        }
    }
}

/// The UDP receive/handle/send loop.
fn run_udp_worker(server: &Server, socket: &UdpSocket, pool: &BufferPool) -> io::Result<()> {
    loop {
        let mut received_buf = pool.acquire();
        let (received_len, src) = match socket.recv_from(&mut received_buf[..]) {
            Ok(tuple) => tuple,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        let mut response_buf = pool.acquire();
        match server.handle_message(
            &received_buf[..received_len],
            ReceivedInfo::new(src.ip(), Transport::Udp),
            &mut response_buf[..],
        ) {
            Response::Single(response_len) => {
                // Don't exit the task if the send fails. (See the note
                // at the beginning of the module.)
                log_io_errors(retry_if_interrupted(|| {
                    socket.send_to(&response_buf[..response_len], src)
                }));
            }
            Response::None => (),
        }
    }
}

/// Handles a TCP connection: length-prefixed messages in, length-
/// prefixed responses out, until the client closes the connection or
/// an error or timeout occurs.
fn handle_tcp_connection(server: &Server, mut socket: TcpStream, client_ip: IpAddr) -> io::Result<()> {
    socket.set_read_timeout(Some(READ_MESSAGE_TIMEOUT))?;
    let mut received_buf = vec![0; u16::MAX as usize];
    let mut response_buf = vec![0; 2 + u16::MAX as usize];

    loop {
        // Read the 2-octet length prefix, then exactly that many
        // octets of message.
        let mut length_prefix = [0; 2];
        match read_exact_or_eof(&mut socket, &mut length_prefix) {
            Ok(true) => (),
            Ok(false) => return Ok(()),
            Err(e) if is_timeout(&e) => {
                debug!("closing TCP connection from {}: read timed out", client_ip);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        let received_len = u16::from_be_bytes(length_prefix) as usize;
        match socket.read_exact(&mut received_buf[..received_len]) {
            Ok(()) => (),
            Err(e) if is_timeout(&e) => {
                debug!("closing TCP connection from {}: read timed out", client_ip);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        // Process the DNS message and write the response (with its
        // own length prefix), if any.
        match server.handle_message(
            &received_buf[..received_len],
            ReceivedInfo::new(client_ip, Transport::Tcp),
            &mut response_buf[2..],
        ) {
            Response::Single(response_len) => {
                response_buf[0..2].copy_from_slice(&u16::to_be_bytes(response_len as u16));
                socket.write_all(&response_buf[0..2 + response_len])?;
            }

            // Response::None occurs when something was really
            // malformed, so close the connection.
            Response::None => return Ok(()),
        }
    }
}

/// Reads exactly `buf.len()` octets, distinguishing a clean EOF before
/// the first octet (`Ok(false)`) from a successful read (`Ok(true)`).
fn read_exact_or_eof(socket: &mut TcpStream, buf: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match socket.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Returns whether an I/O error is a read timeout. Depending on the
/// platform, timeouts surface as `WouldBlock` or `TimedOut`.
fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Executes `f`, retrying the operation if it is interrupted.
fn retry_if_interrupted<F, R>(mut f: F) -> io::Result<R>
where
    F: FnMut() -> io::Result<R>,
{
    loop {
        match f() {
            Ok(r) => return Ok(r),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Logs errors if a task exits with an I/O error.
fn log_io_errors<T>(result: io::Result<T>) {
    if let Err(e) = result {
        let current_thread = thread::current();
        let thread_name = current_thread.name().unwrap_or("anonymous thread");
        error!("I/O error in thread {}: {}", thread_name, e);
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::class::Class;
    use crate::message::{Message, Rcode};
    use crate::name::Name;
    use crate::rr::{Rdata, Record, Ttl, Type};
    use crate::zone::{DictBackend, Zone};

    fn test_server() -> Arc<Server> {
        let context: Name = "example.test.".parse().unwrap();
        let mut backend = DictBackend::new(context.clone());
        backend
            .add(Record {
                owner: context,
                class: Class::IN,
                ttl: Ttl::from(300),
                rdata: Rdata::A([127, 0, 0, 1]),
            })
            .unwrap();
        Arc::new(Server::new(vec![Zone::with_dict(backend)]))
    }

    fn encoded_query() -> Vec<u8> {
        let query = Message::query(
            0x4242,
            "example.test.".parse().unwrap(),
            Type::A,
            Class::IN,
        );
        let mut buf = vec![0; 512];
        let len = query.encode(&mut buf).unwrap();
        buf.truncate(len);
        buf
    }

    #[test]
    fn udp_round_trip() {
        let provider = BlockingIoProvider::bind(
            BlockingIoConfig { udp_workers: 1 },
            (Ipv4Addr::LOCALHOST, 0).into(),
        )
        .unwrap();
        let addr = provider.local_addr().unwrap();
        let server = test_server();
        thread::spawn(move || {
            let _ = provider.serve(server);
        });

        let client = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        client.send_to(&encoded_query(), addr).unwrap();
        let mut buf = [0; 512];
        let (len, _) = client.recv_from(&mut buf).unwrap();
        let response = Message::decode(&buf[..len]).unwrap();
        assert_eq!(response.header.id, 0x4242);
        assert_eq!(response.header.rcode, Rcode::NoError);
        assert_eq!(response.header.ancount, 1);
    }

    #[test]
    fn tcp_round_trip() {
        let provider = BlockingIoProvider::bind(
            BlockingIoConfig { udp_workers: 1 },
            (Ipv4Addr::LOCALHOST, 0).into(),
        )
        .unwrap();
        let addr = provider.local_addr().unwrap();
        let server = test_server();
        thread::spawn(move || {
            let _ = provider.serve(server);
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let query = encoded_query();
        client
            .write_all(&u16::to_be_bytes(query.len() as u16))
            .unwrap();
        client.write_all(&query).unwrap();

        let mut length_prefix = [0; 2];
        client.read_exact(&mut length_prefix).unwrap();
        let len = u16::from_be_bytes(length_prefix) as usize;
        let mut buf = vec![0; len];
        client.read_exact(&mut buf).unwrap();
        let response = Message::decode(&buf).unwrap();
        assert_eq!(response.header.id, 0x4242);
        assert_eq!(response.header.ancount, 1);
        assert!(!response.header.tc);
    }
}
