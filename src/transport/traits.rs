//! Transport seams between the core and the serial link

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use zwave_shared::Frame;

/// Outbound half of the transport as seen by the transaction tracker.
///
/// `send` hands a frame off for transmission and returns; it does not wait
/// for the controller to answer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, frame: Frame) -> Result<()>;
}

/// A byte stream to the controller
#[async_trait]
pub trait TransportStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    async fn shutdown(&mut self) -> Result<()>;
}

/// Opens byte streams to the controller
#[async_trait]
pub trait TransportConnector: Send + Sync {
    type Stream: TransportStream;

    async fn connect(&self) -> Result<Self::Stream>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
