//! Serial framing codec
//!
//! Data frames on the serial link are framed as:
//! ```text
//! [ SOF 0x01 ][ LEN ][ type ][ class ][ payload ... ][ checksum ]
//! ```
//!
//! `LEN` counts every byte after itself, checksum included. The checksum is
//! `0xFF` XOR-ed with every byte from `LEN` through the last payload byte.
//! Between data frames the link carries single-byte ACK, NAK and CAN.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::frame::{Frame, FrameError};

pub const SOF: u8 = 0x01;
pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;
pub const CAN: u8 = 0x18;

/// Largest `[type, class, payload]` block a single LEN byte can describe
pub const MAX_FRAME_DATA: usize = 254;

/// One unit read off the serial link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialUnit {
    Ack,
    Nak,
    Can,
    Data(Frame),
}

fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0xFF, |acc, b| acc ^ b)
}

/// Encode a frame into a complete SOF data frame
pub fn encode(frame: &Frame) -> Result<Bytes, FrameError> {
    let mut buf = BytesMut::new();
    encode_into(frame, &mut buf)?;
    Ok(buf.freeze())
}

/// Encode a frame directly into a provided buffer
pub fn encode_into(frame: &Frame, buf: &mut BytesMut) -> Result<(), FrameError> {
    let data = frame.to_serial();

    if data.len() > MAX_FRAME_DATA {
        return Err(FrameError::TooLong {
            max: MAX_FRAME_DATA,
            actual: data.len(),
        });
    }

    let len = (data.len() + 1) as u8;

    buf.reserve(3 + data.len());
    buf.put_u8(SOF);
    buf.put_u8(len);
    buf.put_slice(&data);
    buf.put_u8(checksum(&[&[len][..], &data[..]].concat()));

    Ok(())
}

/// Try to decode the next unit from a buffer
///
/// Returns:
/// - `Ok(Some(unit))` if a control byte or complete data frame was decoded
/// - `Ok(None)` if more data is needed
/// - `Err(...)` if a data frame was corrupt; its bytes have been consumed
pub fn decode(buf: &mut BytesMut) -> Result<Option<SerialUnit>, FrameError> {
    loop {
        let Some(&first) = buf.first() else {
            return Ok(None);
        };

        match first {
            ACK => {
                buf.advance(1);
                return Ok(Some(SerialUnit::Ack));
            }
            NAK => {
                buf.advance(1);
                return Ok(Some(SerialUnit::Nak));
            }
            CAN => {
                buf.advance(1);
                return Ok(Some(SerialUnit::Can));
            }
            SOF => break,
            // line noise
            _ => buf.advance(1),
        }
    }

    if buf.len() < 2 {
        return Ok(None);
    }

    let len = buf[1];
    // type + class + checksum at minimum
    if len < 3 {
        buf.advance(2);
        return Err(FrameError::InvalidLength(len));
    }

    let total_len = 2 + len as usize;
    if buf.len() < total_len {
        return Ok(None);
    }

    buf.advance(1);
    // LEN, then type/class/payload, then checksum
    let len = len as usize;
    let body = buf.split_to(len + 1);

    let expected = checksum(&body[..len]);
    let actual = body[len];
    if expected != actual {
        return Err(FrameError::BadChecksum { expected, actual });
    }

    let frame = Frame::from_serial(&body[1..len])?;
    Ok(Some(SerialUnit::Data(frame)))
}

/// Decoder state machine for streaming decoding
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(512),
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next unit from the buffer
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all complete units
    pub fn decode_next(&mut self) -> Result<Option<SerialUnit>, FrameError> {
        decode(&mut self.buffer)
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}
