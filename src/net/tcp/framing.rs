//! Request framing: a request ends at the first blank line.
//!
//! There is no body handling. Whatever follows the delimiter is treated as
//! the start of the next request.

use bytes::{Bytes, BytesMut};
use memchr::memmem;

pub const DELIMITER: &[u8] = b"\r\n\r\n";

/// Length of the first complete frame in `buf`, delimiter included.
pub fn frame_len(buf: &[u8]) -> Option<usize> {
    frame_len_from(buf, 0)
}

/// Like [`frame_len`], skipping the first `from` bytes, which must not
/// contain the start of a delimiter.
pub fn frame_len_from(buf: &[u8], from: usize) -> Option<usize> {
    let start = from.min(buf.len());
    memmem::find(&buf[start..], DELIMITER).map(|pos| start + pos + DELIMITER.len())
}

/// Where the next search can start once `len` bytes are known to hold no
/// delimiter. A delimiter may still straddle the end of those bytes.
pub fn resume_offset(len: usize) -> usize {
    len.saturating_sub(DELIMITER.len() - 1)
}

/// Splits the first complete frame off the front of `buf`.
///
/// Leaves `buf` untouched when no delimiter is present.
pub fn extract_frame(buf: &mut BytesMut) -> Option<Bytes> {
    extract_frame_from(buf, 0)
}

/// Like [`extract_frame`], searching from `from`.
pub fn extract_frame_from(buf: &mut BytesMut, from: usize) -> Option<Bytes> {
    let len = frame_len_from(&buf[..], from)?;
    Some(buf.split_to(len).freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_delimiter() {
        let mut buf = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: x\r\n"[..]);
        assert_eq!(extract_frame(&mut buf), None);
        assert_eq!(&buf[..], b"GET / HTTP/1.1\r\nHost: x\r\n");
    }

    #[test]
    fn test_extract_consumes_delimiter() {
        let mut buf = BytesMut::from(&b"GET / HTTP/1.1\r\n\r\n"[..]);
        let frame = extract_frame(&mut buf).unwrap();
        assert_eq!(&frame[..], b"GET / HTTP/1.1\r\n\r\n");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_trailing_bytes_stay_buffered() {
        let mut buf = BytesMut::from(&b"A\r\n\r\nB\r\n"[..]);
        assert_eq!(&extract_frame(&mut buf).unwrap()[..], b"A\r\n\r\n");
        assert_eq!(&buf[..], b"B\r\n");
        assert_eq!(extract_frame(&mut buf), None);
    }

    #[test]
    fn test_pipelined_frames() {
        let mut buf = BytesMut::from(&b"A\r\n\r\nB\r\n\r\n"[..]);
        assert_eq!(&extract_frame(&mut buf).unwrap()[..], b"A\r\n\r\n");
        assert_eq!(&extract_frame(&mut buf).unwrap()[..], b"B\r\n\r\n");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_frame() {
        assert_eq!(frame_len(b"\r\n\r\n"), Some(4));
        assert_eq!(frame_len(b"\r\n\r"), None);
        assert_eq!(frame_len(b""), None);
    }

    #[test]
    fn test_resume_finds_delimiter_across_reads() {
        let mut buf = BytesMut::from(&b"GET / HTTP/1.1\r\n\r"[..]);
        assert_eq!(frame_len(&buf[..]), None);
        let from = resume_offset(buf.len());
        assert_eq!(from, buf.len() - 3);

        buf.extend_from_slice(b"\nnext");
        let frame = extract_frame_from(&mut buf, from).unwrap();
        assert_eq!(&frame[..], b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(&buf[..], b"next");
    }

    #[test]
    fn test_resume_offset_bounds() {
        assert_eq!(resume_offset(0), 0);
        assert_eq!(resume_offset(2), 0);
        assert_eq!(resume_offset(10), 7);
        // An offset past the end just finds nothing.
        assert_eq!(frame_len_from(b"\r\n\r\n", 10), None);
        assert_eq!(frame_len_from(b"xx\r\n\r\n", 1), Some(6));
    }

    #[test]
    fn test_overlapping_crlf_runs() {
        // The first blank line wins even inside a longer run of CRLFs.
        assert_eq!(frame_len(b"x\r\n\r\n\r\n"), Some(5));
        assert_eq!(frame_len(b"\r\r\n\r\n"), Some(5));
    }
}
