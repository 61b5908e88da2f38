// Pilot sessions: framed command batches in, framed snapshot documents out.

use super::framing::{FrameError, FrameReader, write_message};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{CommandBatch, parse_batch};

use std::{
    io,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{Instrument, debug, info, info_span, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug)]
enum SessionEnd {
    Frame(FrameError),
    CommandsClosed,
}

impl From<FrameError> for SessionEnd {
    fn from(e: FrameError) -> Self {
        SessionEnd::Frame(e)
    }
}

fn next_conn_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Accepts pilot connections until shutdown, one task per connection.
pub async fn serve_pilots(listener: TcpListener, state: Arc<AppState>) -> io::Result<()> {
    let address = listener.local_addr()?;
    info!(%address, "pilot listener ready");

    let mut shutdown = state.shutdown_tx.subscribe();
    loop {
        if *shutdown.borrow_and_update() {
            info!("pilot listener stopping");
            return Ok(());
        }
        tokio::select! {
            _ = shutdown.changed() => continue,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(handle_pilot(stream, peer, state.clone()));
                }
                Err(e) => warn!(error = %e, "failed to accept pilot connection"),
            }
        }
    }
}

async fn handle_pilot(stream: TcpStream, peer: SocketAddr, state: Arc<AppState>) {
    let span = info_span!("pilot", conn_id = next_conn_id(), %peer);
    async move {
        info!("pilot connected");
        match run_session(stream, &state).await {
            Ok(()) | Err(SessionEnd::Frame(FrameError::Closed)) => info!("pilot disconnected"),
            Err(SessionEnd::CommandsClosed) => warn!("world loop gone; closing pilot session"),
            Err(SessionEnd::Frame(e)) => warn!(error = %e, "pilot session ended"),
        }
    }
    .instrument(span)
    .await
}

async fn run_session(stream: TcpStream, state: &AppState) -> Result<(), SessionEnd> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = FrameReader::new(read_half);
    let latest_rx = state.snapshot_latest_tx.subscribe();
    let mut last_full_log: Option<Instant> = None;

    loop {
        let message = reader.read_message().await?;
        let batch = parse_batch(&message);
        if !batch.is_empty() {
            debug!(commands = batch.len(), "command batch received");
            queue_batch(&state.command_tx, batch, &mut last_full_log)?;
        }

        // Clone out of the borrow before awaiting on the socket.
        let snapshot = latest_rx.borrow().clone();
        write_message(&mut write_half, &snapshot).await?;
    }
}

// A batch goes into the queue whole or not at all.
fn queue_batch(
    command_tx: &mpsc::Sender<CommandBatch>,
    batch: CommandBatch,
    last_full_log: &mut Option<Instant>,
) -> Result<(), SessionEnd> {
    match command_tx.try_send(batch) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(batch)) => {
            if should_log(last_full_log) {
                warn!(commands = batch.len(), "command queue full; dropping batch");
            }
            Ok(())
        }
        Err(TrySendError::Closed(_)) => Err(SessionEnd::CommandsClosed),
    }
}

fn should_log(last: &mut Option<Instant>) -> bool {
    match last {
        Some(at) if at.elapsed() < LOG_THROTTLE => false,
        _ => {
            *last = Some(Instant::now());
            true
        }
    }
}
