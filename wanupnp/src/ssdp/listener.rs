/*!
The WANWatch SSDP listener is a one-shot *control point*.

It binds an ephemeral UDP port (never 1900), sends a single M-SEARCH and keeps
the first decoded reply. Gateways usually answer several times and NATs may
duplicate datagrams: everything after the first reply is ignored.

Two worker threads live for the duration of one `discover` call:

* `ssdp-recv` reads datagrams (512-byte buffer) and forwards the raw bytes,
* `ssdp-decode` turns each datagram into a [`DiscoveryResponse`].

Both are stopped and joined before `discover` returns, whether a reply
arrived or the deadline expired.
*/

use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError, after, bounded, select, unbounded};
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::{
    DiscoveryQuery, DiscoveryResponse, MULTICAST_TTL, RECV_BUFFER_SIZE, SSDP_MULTICAST_IPV4,
    SSDP_PORT, decode_response,
};

/// Intervalle auquel la boucle de réception vérifie le signal d'arrêt
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("timed out after {0:?} waiting for discovery response")]
    Timeout(Duration),

    #[error("SSDP socket error: {0}")]
    Io(#[from] io::Error),

    #[error("SSDP listener stopped before any response was received")]
    ListenerClosed,
}

/// Source d'une réponse de découverte de la passerelle.
pub trait GatewayDiscovery {
    /// Attend la première réponse, au plus `timeout`.
    fn discover(&self, timeout: Duration) -> Result<DiscoveryResponse, DiscoveryError>;
}

/// Listener SSDP pour la découverte du service WANIPConnection
pub struct SsdpListener {
    socket: UdpSocket,
    target: SocketAddr,
}

impl SsdpListener {
    /// Crée un listener sur toutes les interfaces IPv4
    pub fn new() -> io::Result<Self> {
        Self::bind(Ipv4Addr::UNSPECIFIED)
    }

    /// Crée un listener sur un port éphémère de l'adresse donnée
    pub fn bind(addr: Ipv4Addr) -> io::Result<Self> {
        let socket2 = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket2.set_reuse_address(true)?;
        socket2.set_multicast_ttl_v4(MULTICAST_TTL)?;

        let bind_addr = SocketAddr::from((addr, 0));
        socket2.bind(&bind_addr.into())?;

        let socket: UdpSocket = socket2.into();
        socket.set_read_timeout(Some(POLL_INTERVAL))?;

        info!("✅ SSDP listener ready on UDP {}", socket.local_addr()?);

        Ok(Self {
            socket,
            target: SocketAddr::from((SSDP_MULTICAST_IPV4, SSDP_PORT)),
        })
    }

    /// Change la destination du M-SEARCH (multicast SSDP par défaut)
    pub fn with_target(mut self, target: SocketAddr) -> Self {
        self.target = target;
        self
    }

    fn send_query(&self, query: &DiscoveryQuery) -> io::Result<()> {
        match self.socket.send_to(&query.to_bytes(), self.target) {
            Ok(_) => {
                info!(
                    "📤 M-SEARCH sent to {} (ST={}, MX={})",
                    self.target,
                    query.search_target(),
                    query.mx()
                );
                debug!("📨 M-SEARCH payload\n{}", query);
                Ok(())
            }
            Err(e) => {
                warn!("❌ Failed to send M-SEARCH to {}: {}", self.target, e);
                Err(e)
            }
        }
    }
}

impl GatewayDiscovery for SsdpListener {
    fn discover(&self, timeout: Duration) -> Result<DiscoveryResponse, DiscoveryError> {
        let (raw_tx, raw_rx) = unbounded::<Vec<u8>>();
        let (decoded_tx, decoded_rx) = unbounded::<DiscoveryResponse>();
        // Never written to: dropping the sender is the stop signal.
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let receiver = spawn_receiver(self.socket.try_clone()?, raw_tx, stop_rx.clone())?;
        let decoder = spawn_decoder(raw_rx, decoded_tx, stop_rx)?;

        let query = DiscoveryQuery::new(timeout);
        let result = match self.send_query(&query) {
            Ok(()) => wait_first(&decoded_rx, timeout),
            Err(e) => Err(DiscoveryError::Io(e)),
        };

        drop(stop_tx);
        join_worker(receiver);
        join_worker(decoder);

        result
    }
}

fn wait_first(
    decoded_rx: &Receiver<DiscoveryResponse>,
    timeout: Duration,
) -> Result<DiscoveryResponse, DiscoveryError> {
    select! {
        recv(decoded_rx) -> msg => match msg {
            Ok(response) => {
                info!("📥 Discovery response received ({} headers)", response.len());
                Ok(response)
            }
            Err(_) => Err(DiscoveryError::ListenerClosed),
        },
        recv(after(timeout)) -> _ => {
            warn!("⏱️ No discovery response after {:?}", timeout);
            Err(DiscoveryError::Timeout(timeout))
        }
    }
}

fn spawn_receiver(
    socket: UdpSocket,
    raw_tx: Sender<Vec<u8>>,
    stop_rx: Receiver<()>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ssdp-recv".to_string())
        .spawn(move || {
            let mut buf = [0u8; RECV_BUFFER_SIZE];
            loop {
                if let Err(TryRecvError::Disconnected) = stop_rx.try_recv() {
                    break;
                }

                match socket.recv_from(&mut buf) {
                    Ok((n, from)) => {
                        debug!("SSDP datagram from {} ({} bytes)", from, n);
                        if raw_tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e)
                        if e.kind() == io::ErrorKind::WouldBlock
                            || e.kind() == io::ErrorKind::TimedOut =>
                    {
                        continue;
                    }
                    Err(e) => {
                        warn!("❌ SSDP receive error: {}", e);
                        break;
                    }
                }
            }
            trace!("ssdp-recv stopped");
        })
}

fn spawn_decoder(
    raw_rx: Receiver<Vec<u8>>,
    decoded_tx: Sender<DiscoveryResponse>,
    stop_rx: Receiver<()>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ssdp-decode".to_string())
        .spawn(move || {
            loop {
                select! {
                    recv(raw_rx) -> packet => {
                        let Ok(packet) = packet else { break };
                        let response = decode_response(&packet);
                        trace!("Decoded SSDP response: {:?}", response);
                        if decoded_tx.send(response).is_err() {
                            break;
                        }
                    }
                    recv(stop_rx) -> _ => break,
                }
            }
            trace!("ssdp-decode stopped");
        })
}

fn join_worker(handle: JoinHandle<()>) {
    let name = handle.thread().name().unwrap_or("ssdp-worker").to_string();
    if handle.join().is_err() {
        warn!("SSDP worker {} panicked", name);
    }
}
