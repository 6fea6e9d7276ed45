pub mod link;
pub mod serial;
pub mod traits;

pub use link::{run_link, SerialLink, OUTBOUND_QUEUE};
pub use serial::{SerialConnector, SerialTransportStream};
pub use traits::{Transport, TransportConnector, TransportStream};

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use zwave_shared::Frame;

    use super::Transport;

    /// Transport that records every frame instead of sending it
    #[derive(Default)]
    pub struct RecordingTransport {
        sent: Mutex<Vec<Frame>>,
        fail: AtomicBool,
    }

    impl RecordingTransport {
        pub fn sent(&self) -> Vec<Frame> {
            self.sent.lock().unwrap().clone()
        }

        pub fn fail_sends(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, frame: Frame) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(anyhow!("link down"));
            }
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }
    }
}
