//! Serial link driver
//!
//! Owns the byte stream to the controller: writes queued frames, reads and
//! acknowledges inbound frames, and feeds them to the transaction tracker
//! one at a time in arrival order.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};
use zwave_shared::codec::{self, FrameDecoder, SerialUnit};
use zwave_shared::{Frame, FrameError, MessageClass};

use super::traits::{Transport, TransportStream};
use crate::transaction::TransactionTracker;

/// Queue depth between the tracker and the link task
pub const OUTBOUND_QUEUE: usize = 64;

/// Sending half of the link. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SerialLink {
    outbound: mpsc::Sender<Frame>,
}

impl SerialLink {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (outbound, outbound_rx) = mpsc::channel(capacity);
        (Self { outbound }, outbound_rx)
    }
}

#[async_trait]
impl Transport for SerialLink {
    async fn send(&self, frame: Frame) -> Result<()> {
        self.outbound
            .send(frame)
            .await
            .map_err(|_| anyhow!("Serial link closed"))
    }
}

/// Rolling SendData callback id, 1..=255
#[derive(Debug, Default)]
struct CallbackIds {
    last: u8,
}

impl CallbackIds {
    fn next(&mut self) -> u8 {
        self.last = self.last.checked_add(1).unwrap_or(1);
        self.last
    }

    /// SendData requests carry a trailing callback id; other frames pass through
    fn stamp(&mut self, frame: Frame) -> Frame {
        if frame.class() != MessageClass::SendData {
            return frame;
        }
        let mut payload = frame.payload().to_vec();
        payload.push(self.next());
        Frame::request(frame.class(), frame.header().priority, frame.node(), payload)
    }
}

/// Drive the link until the stream closes or every [`SerialLink`] is dropped
pub async fn run_link<S: TransportStream>(
    stream: S,
    mut outbound: mpsc::Receiver<Frame>,
    tracker: Arc<TransactionTracker>,
) -> Result<()> {
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut decoder = FrameDecoder::new();
    let mut read_buf = vec![0u8; 512];
    let mut callbacks = CallbackIds::default();

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    debug!("Outbound queue closed, stopping link");
                    let mut stream = reader.unsplit(writer);
                    return TransportStream::shutdown(&mut stream).await;
                };
                let frame = callbacks.stamp(frame);
                let encoded = codec::encode(&frame)?;
                trace!("TX {:02X?}", encoded.as_ref());
                writer.write_all(&encoded).await?;
                writer.flush().await?;
            }

            read = reader.read(&mut read_buf) => {
                let n = read?;
                if n == 0 {
                    return Err(anyhow!("Serial link closed by controller"));
                }
                trace!("RX {:02X?}", &read_buf[..n]);
                decoder.extend(&read_buf[..n]);

                loop {
                    match decoder.decode_next() {
                        Ok(Some(SerialUnit::Data(frame))) => {
                            writer.write_all(&[codec::ACK]).await?;
                            if let Err(e) = tracker.on_frame_received(frame).await {
                                warn!("Inbound frame not processed: {}", e);
                            }
                        }
                        Ok(Some(SerialUnit::Ack)) => trace!("ACK"),
                        Ok(Some(SerialUnit::Nak | SerialUnit::Can)) => {
                            warn!("Controller did not accept the last frame");
                        }
                        Ok(None) => break,
                        Err(e @ (FrameError::BadChecksum { .. } | FrameError::InvalidLength(_))) => {
                            warn!("Corrupt frame on the link: {}", e);
                            writer.write_all(&[codec::NAK]).await?;
                        }
                        Err(e) => {
                            // framing was intact, only the content is unknown to us
                            debug!("Ignoring frame: {}", e);
                            writer.write_all(&[codec::ACK]).await?;
                        }
                    }
                }
                writer.flush().await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use zwave_shared::NodeId;

    use super::*;
    use crate::command::{Command, QueryTarget, SetAction};
    use crate::events::EventRouter;
    use crate::transaction::{unit, TransactionResult};
    use crate::transport::testing::RecordingTransport;

    #[async_trait]
    impl TransportStream for tokio::io::DuplexStream {
        async fn shutdown(&mut self) -> Result<()> {
            AsyncWriteExt::shutdown(self).await?;
            Ok(())
        }
    }

    fn tracker() -> Arc<TransactionTracker> {
        Arc::new(TransactionTracker::new(
            Arc::new(RecordingTransport::default()),
            Arc::new(EventRouter::new()),
            Duration::from_secs(5),
        ))
    }

    async fn read_some(stream: &mut tokio::io::DuplexStream) -> Vec<u8> {
        let mut buf = vec![0u8; 64];
        let n = stream.read(&mut buf).await.unwrap();
        buf.truncate(n);
        buf
    }

    #[test]
    fn test_callback_ids_wrap_past_zero() {
        let mut ids = CallbackIds { last: 254 };
        assert_eq!(ids.next(), 255);
        assert_eq!(ids.next(), 1);
    }

    #[tokio::test]
    async fn test_writes_framed_requests() {
        let (link, outbound_rx) = SerialLink::channel(OUTBOUND_QUEUE);
        let (ours, mut controller) = tokio::io::duplex(256);
        let task = tokio::spawn(run_link(ours, outbound_rx, tracker()));

        link.send(unit::encode(&Command::ControllerVersion)).await.unwrap();
        assert_eq!(read_some(&mut controller).await, vec![0x01, 0x03, 0x00, 0x15, 0xE9]);

        drop(link);
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_send_data_gets_callback_id() {
        let (link, outbound_rx) = SerialLink::channel(OUTBOUND_QUEUE);
        let (ours, mut controller) = tokio::io::duplex(256);
        let _task = tokio::spawn(run_link(ours, outbound_rx, tracker()));

        let frame = unit::encode(&Command::set(NodeId(5), SetAction::Basic(0xFF)));
        link.send(frame).await.unwrap();

        let wire = read_some(&mut controller).await;
        // SOF LEN type class | node len 20 01 FF opts cb | checksum
        assert_eq!(wire[..4], [0x01, 0x0A, 0x00, 0x13]);
        assert_eq!(wire[4..11], [0x05, 0x03, 0x20, 0x01, 0xFF, 0x25, 0x01]);
    }

    #[tokio::test]
    async fn test_inbound_frame_is_acked_and_matched() {
        let tracker = tracker();
        let handle = tracker.submit(Command::IsFailedNode(NodeId(4))).await.unwrap();

        let (_link, outbound_rx) = SerialLink::channel(OUTBOUND_QUEUE);
        let (ours, mut controller) = tokio::io::duplex(256);
        let _task = tokio::spawn(run_link(ours, outbound_rx, tracker.clone()));

        let response = Frame::inbound(
            MessageClass::IsFailedNodeId,
            zwave_shared::FrameType::Response,
            None,
            vec![0x01],
        );
        controller
            .write_all(&codec::encode(&response).unwrap())
            .await
            .unwrap();

        assert_eq!(read_some(&mut controller).await, vec![codec::ACK]);
        assert_eq!(handle.outcome().await, Some(Ok(TransactionResult::NodeFailed(true))));
    }

    /// Read from the controller side until `count` data frames have arrived
    async fn read_frames(stream: &mut tokio::io::DuplexStream, count: usize) -> Vec<Frame> {
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        while frames.len() < count {
            decoder.extend(&read_some(stream).await);
            while let Some(unit) = decoder.decode_next().unwrap() {
                if let SerialUnit::Data(frame) = unit {
                    frames.push(frame);
                }
            }
        }
        frames
    }

    #[tokio::test]
    async fn test_serial_round_trip_completes_query_and_set() {
        let (link, outbound_rx) = SerialLink::channel(OUTBOUND_QUEUE);
        let tracker = Arc::new(TransactionTracker::new(
            Arc::new(link),
            Arc::new(EventRouter::new()),
            Duration::from_secs(5),
        ));
        let (ours, mut controller) = tokio::io::duplex(1024);
        let _task = tokio::spawn(run_link(ours, outbound_rx, tracker.clone()));

        let query = tracker
            .submit(Command::query(NodeId(6), QueryTarget::MultilevelSwitch))
            .await
            .unwrap();
        let set = tracker
            .submit(Command::set(NodeId(5), SetAction::MultilevelSwitch(200)))
            .await
            .unwrap();

        let written = read_frames(&mut controller, 2).await;
        assert_eq!(written[0].payload()[..4], [0x06, 0x02, 0x26, 0x02]);
        assert_eq!(written[1].payload()[..5], [0x05, 0x03, 0x26, 0x01, 0xC8]);

        let ack = Frame::inbound(
            MessageClass::SendData,
            zwave_shared::FrameType::Response,
            None,
            vec![0x01],
        );
        let report = Frame::from_serial(&[0x00, 0x04, 0x00, 0x06, 0x03, 0x26, 0x03, 0x63]).unwrap();
        let mut wire = Vec::new();
        for frame in [&ack, &ack, &report] {
            wire.extend_from_slice(&codec::encode(frame).unwrap());
        }
        controller.write_all(&wire).await.unwrap();

        assert_eq!(set.outcome().await, Some(Ok(TransactionResult::Transmitted)));
        assert_eq!(query.outcome().await, Some(Ok(TransactionResult::Level(0x63))));
        assert_eq!(tracker.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_corrupt_frame_is_nakked() {
        let (_link, outbound_rx) = SerialLink::channel(OUTBOUND_QUEUE);
        let (ours, mut controller) = tokio::io::duplex(256);
        let _task = tokio::spawn(run_link(ours, outbound_rx, tracker()));

        controller.write_all(&[0x01, 0x03, 0x00, 0x15, 0x00]).await.unwrap();
        assert_eq!(read_some(&mut controller).await, vec![codec::NAK]);
    }

    #[tokio::test]
    async fn test_closed_stream_ends_link() {
        let (_link, outbound_rx) = SerialLink::channel(OUTBOUND_QUEUE);
        let (ours, controller) = tokio::io::duplex(256);
        let task = tokio::spawn(run_link(ours, outbound_rx, tracker()));

        drop(controller);
        assert!(task.await.unwrap().is_err());
    }
}
