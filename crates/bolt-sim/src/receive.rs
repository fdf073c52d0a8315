//! Receive loop (strike detector only)
//!
//! Polls the inbound half of the transport with a bounded 10 ms wait,
//! feeds whatever arrives into the [`SquelchCodec`], and writes the
//! plain-text acknowledgement for each extracted command through the same
//! shared writer lock the transmit loop uses. Malformed commands are
//! logged by the codec and produce no acknowledgement; the loop keeps
//! running. Transient read errors are likewise logged and retried on the
//! next tick; only a permanently closed transport ends the loop.

use std::io;
use std::sync::Arc;

use bolt_protocol::SquelchCodec;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::device::TICK;
use crate::transmit::{is_disconnect, write_frame};

/// Run the receive loop until shutdown or transport closure.
pub async fn run_receive_task<R, W>(
    mut reader: R,
    writer: Arc<tokio::sync::Mutex<W>>,
    shutdown: watch::Receiver<bool>,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Starting receive loop");

    let mut codec = SquelchCodec::new();
    let mut buf = [0u8; 256];

    loop {
        if shutdown.has_changed().is_err() || *shutdown.borrow() {
            break;
        }

        // Bounded read: wake at least once per tick even with no traffic
        match timeout(TICK, reader.read(&mut buf)).await {
            Ok(Ok(0)) => {
                debug!("Inbound stream closed, ending receive loop");
                break;
            }
            Ok(Ok(n)) => {
                debug!("Received {} inbound bytes: {:02X?}", n, &buf[..n]);
                codec.push_bytes(&buf[..n]);
            }
            Ok(Err(e)) if is_disconnect(e.kind()) => {
                warn!("Inbound stream closed, ending receive loop: {}", e);
                return Err(e);
            }
            Ok(Err(e)) => {
                warn!("Inbound read failed, retrying next tick: {}", e);
            }
            Err(_) => {} // no data this tick
        }

        // At most one command per pass; leftovers stay buffered
        if let Some(cmd) = codec.next_command() {
            debug!("Squelch command received, echoing level {}", cmd.value);
            write_frame(&writer, &cmd.ack()).await?;
        }
    }

    info!("Receive loop ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncWriteExt, ReadBuf};

    /// Reader that fails with an injected error kind on its first poll,
    /// then delegates to the wrapped reader.
    struct IntermittentReader<R> {
        inner: R,
        inject: Option<io::ErrorKind>,
    }

    impl<R: AsyncRead + Unpin> AsyncRead for IntermittentReader<R> {
        fn poll_read(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            if let Some(kind) = this.inject.take() {
                return Poll::Ready(Err(io::Error::new(kind, "injected read failure")));
            }
            Pin::new(&mut this.inner).poll_read(cx, buf)
        }
    }

    async fn read_exact_timeout<R: AsyncRead + Unpin>(reader: &mut R, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        tokio::time::timeout(Duration::from_millis(500), reader.read_exact(&mut out))
            .await
            .expect("timed out waiting for ack")
            .unwrap();
        out
    }

    #[tokio::test]
    async fn test_squelch_ack_round_trip() {
        let (mut peer, stream) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(stream);
        let writer = Arc::new(tokio::sync::Mutex::new(writer));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_receive_task(reader, writer, shutdown_rx));

        peer.write_all(b"SQ7\r").await.unwrap();

        let ack = read_exact_timeout(&mut peer, b":SQUELCH 7 (0-15)\r\n".len()).await;
        assert_eq!(ack, b":SQUELCH 7 (0-15)\r\n");

        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_back_to_back_commands_acked_in_order() {
        let (mut peer, stream) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(stream);
        let writer = Arc::new(tokio::sync::Mutex::new(writer));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_receive_task(reader, writer, shutdown_rx));

        // Both commands land in one read; extraction is one per pass
        peer.write_all(b"SQ5\rSQ9\r").await.unwrap();

        let acks = read_exact_timeout(
            &mut peer,
            b":SQUELCH 5 (0-15)\r\n:SQUELCH 9 (0-15)\r\n".len(),
        )
        .await;
        assert_eq!(acks, b":SQUELCH 5 (0-15)\r\n:SQUELCH 9 (0-15)\r\n");

        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_malformed_command_ignored() {
        let (mut peer, stream) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(stream);
        let writer = Arc::new(tokio::sync::Mutex::new(writer));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_receive_task(reader, writer, shutdown_rx));

        peer.write_all(b"SQnope\rSQ2\r").await.unwrap();

        // Only the valid command is acknowledged
        let ack = read_exact_timeout(&mut peer, b":SQUELCH 2 (0-15)\r\n".len()).await;
        assert_eq!(ack, b":SQUELCH 2 (0-15)\r\n");

        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_transient_read_error_keeps_loop_running() {
        let (mut peer, stream) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(stream);
        let reader = IntermittentReader {
            inner: reader,
            inject: Some(io::ErrorKind::TimedOut),
        };
        let writer = Arc::new(tokio::sync::Mutex::new(writer));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_receive_task(reader, writer, shutdown_rx));

        // The injected failure is absorbed; a command sent afterwards is
        // still acknowledged
        peer.write_all(b"SQ7\r").await.unwrap();

        let ack = read_exact_timeout(&mut peer, b":SQUELCH 7 (0-15)\r\n".len()).await;
        assert_eq!(ack, b":SQUELCH 7 (0-15)\r\n");

        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_disconnect_read_error_ends_loop() {
        let (_peer, stream) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(stream);
        let reader = IntermittentReader {
            inner: reader,
            inject: Some(io::ErrorKind::BrokenPipe),
        };
        let writer = Arc::new(tokio::sync::Mutex::new(writer));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_receive_task(reader, writer, shutdown_rx));

        let result = tokio::time::timeout(Duration::from_millis(200), task)
            .await
            .expect("loop did not end on transport closure");
        assert_eq!(
            result.unwrap().unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
    }

    #[tokio::test]
    async fn test_peer_close_ends_loop() {
        let (peer, stream) = tokio::io::duplex(1024);
        let (reader, writer) = tokio::io::split(stream);
        let writer = Arc::new(tokio::sync::Mutex::new(writer));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run_receive_task(reader, writer, shutdown_rx));

        drop(peer);

        let result = tokio::time::timeout(Duration::from_millis(200), task)
            .await
            .expect("loop did not end on stream closure");
        assert!(result.unwrap().is_ok());
    }
}
