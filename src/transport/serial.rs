//! Serial port transport for USB controller sticks

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};

use crate::transport::traits::{TransportConnector, TransportStream};

pub struct SerialTransportStream {
    inner: SerialStream,
}

impl SerialTransportStream {
    pub fn new(stream: SerialStream) -> Self {
        Self { inner: stream }
    }
}

impl AsyncRead for SerialTransportStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for SerialTransportStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[async_trait]
impl TransportStream for SerialTransportStream {
    async fn shutdown(&mut self) -> Result<()> {
        tokio::io::AsyncWriteExt::shutdown(&mut self.inner).await?;
        Ok(())
    }
}

/// Opens the controller's serial device (8N1, no flow control)
pub struct SerialConnector {
    path: String,
    baud_rate: u32,
}

impl SerialConnector {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl TransportConnector for SerialConnector {
    type Stream = SerialTransportStream;

    async fn connect(&self) -> Result<Self::Stream> {
        let stream = tokio_serial::new(&self.path, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open_native_async()
            .with_context(|| format!("failed to open serial port {}", self.path))?;
        Ok(SerialTransportStream::new(stream))
    }

    fn name(&self) -> &'static str {
        "Serial"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_connector() {
        let connector = SerialConnector::new("/dev/ttyACM0", 115_200);
        assert_eq!(connector.name(), "Serial");
        assert_eq!(connector.path(), "/dev/ttyACM0");
    }

    #[tokio::test]
    async fn test_missing_port_fails_to_connect() {
        let connector = SerialConnector::new("/dev/does-not-exist-zwave", 115_200);
        assert!(connector.connect().await.is_err());
    }
}
