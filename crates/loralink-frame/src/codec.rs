//! Frame encoding and decoding.
//!
//! Encoding is all-or-nothing: an oversize payload produces an error and no
//! bytes. Decoding reads the 4 header bytes and then drains the source; the
//! drained byte count must equal the declared length.

use bytes::{Buf, BufMut};

use crate::{Address, Frame, FrameError, HEADER_SIZE, MAX_PAYLOAD_LEN};

// ============================================================================
// Encoding Functions
// ============================================================================

/// Encode a frame to bytes.
///
/// Fails with [`FrameError::PayloadTooLarge`] when `payload` is longer than
/// [`MAX_PAYLOAD_LEN`].
pub fn encode_frame(
    destination: Address,
    sender: Address,
    sequence: u8,
    payload: &[u8],
) -> Result<Vec<u8>, FrameError> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    encode_frame_into(&mut buf, destination, sender, sequence, payload)?;
    Ok(buf)
}

/// Encode a frame into an existing buffer.
///
/// Nothing is written to `buf` when the payload is rejected.
pub fn encode_frame_into<B: BufMut>(
    buf: &mut B,
    destination: Address,
    sender: Address,
    sequence: u8,
    payload: &[u8],
) -> Result<(), FrameError> {
    check_payload_len(payload.len())?;

    buf.put_u8(destination);
    buf.put_u8(sender);
    buf.put_u8(sequence);
    buf.put_u8(payload.len() as u8);
    buf.put_slice(payload);

    Ok(())
}

/// Validate a payload length against [`MAX_PAYLOAD_LEN`].
pub fn check_payload_len(len: usize) -> Result<(), FrameError> {
    if len > MAX_PAYLOAD_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: MAX_PAYLOAD_LEN,
        });
    }
    Ok(())
}

// ============================================================================
// Decoding Functions
// ============================================================================

/// Decode a frame from a byte slice.
///
/// Returns `Ok(None)` when `data` is empty (no packet this cycle).
pub fn decode_frame(data: &[u8]) -> Result<Option<Frame>, FrameError> {
    let mut source = data;
    decode_buf(&mut source)
}

/// Decode a frame from any byte source, consuming it entirely.
///
/// - `Ok(None)`: nothing was available.
/// - `Err(TruncatedHeader)`: fewer than 4 bytes were available.
/// - `Err(LengthMismatch)`: the payload byte count differs from the header.
pub fn decode_buf<B: Buf>(source: &mut B) -> Result<Option<Frame>, FrameError> {
    let available = source.remaining();
    if available == 0 {
        return Ok(None);
    }

    if available < HEADER_SIZE {
        source.advance(available);
        return Err(FrameError::TruncatedHeader {
            available,
            needed: HEADER_SIZE,
        });
    }

    let destination = source.get_u8();
    let sender = source.get_u8();
    let sequence = source.get_u8();
    let declared = source.get_u8();

    let mut payload = Vec::with_capacity(source.remaining());
    while source.has_remaining() {
        let chunk = source.chunk();
        let n = chunk.len();
        payload.extend_from_slice(chunk);
        source.advance(n);
    }

    if payload.len() != declared as usize {
        return Err(FrameError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }

    Ok(Some(Frame {
        destination,
        sender,
        sequence,
        payload,
    }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BROADCAST_ADDRESS;
    use bytes::{Bytes, BytesMut};

    #[test]
    fn test_header_layout() {
        let encoded = encode_frame(2, 1, 42, b"relay:on").unwrap();

        assert_eq!(encoded.len(), HEADER_SIZE + 8);
        assert_eq!(&encoded[..HEADER_SIZE], &[2, 1, 42, 8]);
        assert_eq!(&encoded[HEADER_SIZE..], b"relay:on");
    }

    #[test]
    fn test_text_roundtrip() {
        let payload = br#"{"id":"tiny32-AB12CD","fw":"1.0","topic":"inverter",220.5,5.2,1150.0,49.9,0.0,0.0,0.0,0.0,0.0,0.0}"#;
        let encoded = encode_frame(1, 3, 17, payload).unwrap();
        let decoded = decode_frame(&encoded).unwrap().expect("frame");

        assert_eq!(decoded.destination, 1);
        assert_eq!(decoded.sender, 3);
        assert_eq!(decoded.sequence, 17);
        assert_eq!(decoded.payload, payload.to_vec());
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let encoded = encode_frame(BROADCAST_ADDRESS, 1, 0, &[]).unwrap();
        assert_eq!(encoded, vec![BROADCAST_ADDRESS, 1, 0, 0]);

        let decoded = decode_frame(&encoded).unwrap().expect("frame");
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_max_payload_accepted() {
        let payload = vec![b'x'; MAX_PAYLOAD_LEN];
        let encoded = encode_frame(5, 1, 99, &payload).unwrap();
        assert_eq!(encoded[3], 250);
        assert_eq!(decode_frame(&encoded).unwrap().unwrap().payload.len(), 250);
    }

    #[test]
    fn test_oversize_payload_rejected() {
        let payload = vec![b'x'; MAX_PAYLOAD_LEN + 1];
        let err = encode_frame(5, 1, 0, &payload).unwrap_err();
        assert_eq!(err, FrameError::PayloadTooLarge { size: 251, max: 250 });
    }

    #[test]
    fn test_oversize_writes_nothing() {
        let mut buf = BytesMut::new();
        let payload = vec![0u8; 300];
        assert!(encode_frame_into(&mut buf, 5, 1, 0, &payload).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_empty_is_no_packet() {
        assert_eq!(decode_frame(&[]).unwrap(), None);
    }

    #[test]
    fn test_decode_truncated_header() {
        let err = decode_frame(&[1, 2]).unwrap_err();
        assert_eq!(err, FrameError::TruncatedHeader { available: 2, needed: 4 });
    }

    #[test]
    fn test_decode_short_payload() {
        // Declares 10 bytes, carries 7
        let mut data = vec![1, 3, 8, 10];
        data.extend_from_slice(b"1234567");

        let err = decode_frame(&data).unwrap_err();
        assert_eq!(err, FrameError::LengthMismatch { declared: 10, actual: 7 });
    }

    #[test]
    fn test_decode_long_payload() {
        let mut data = vec![1, 3, 8, 2];
        data.extend_from_slice(b"abc");

        let err = decode_frame(&data).unwrap_err();
        assert_eq!(err, FrameError::LengthMismatch { declared: 2, actual: 3 });
    }

    #[test]
    fn test_decode_buf_drains_source() {
        let encoded = encode_frame(1, 2, 3, b"abc").unwrap();
        let mut source = Bytes::from(encoded);

        let frame = decode_buf(&mut source).unwrap().expect("frame");
        assert_eq!(frame.payload, b"abc");
        assert!(!source.has_remaining());

        // A drained source reads as "no packet" on the next poll
        assert_eq!(decode_buf(&mut source).unwrap(), None);
    }

    #[test]
    fn test_decode_buf_drains_on_error() {
        let mut source = Bytes::from_static(&[1, 2, 3, 9, b'x']);
        assert!(decode_buf(&mut source).is_err());
        assert!(!source.has_remaining());
    }

    #[test]
    fn test_frame_encode_matches_free_function() {
        let frame = Frame::new(2, 1, 5, "relay:off");
        assert_eq!(frame.encode().unwrap(), encode_frame(2, 1, 5, b"relay:off").unwrap());
    }
}
