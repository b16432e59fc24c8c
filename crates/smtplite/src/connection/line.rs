//! CRLF line reader.
//!
//! Reassembles a raw byte stream into lines. Reads are batched into a small
//! buffer; bytes after a delimiter stay buffered for the next call.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

/// Bytes requested from the stream per read.
const READ_CHUNK: usize = 512;

/// Maximum line length to bound memory against a misbehaving server.
pub const MAX_LINE_LENGTH: usize = 4096;

/// Reads CRLF-terminated lines from a byte stream.
#[derive(Debug)]
pub struct LineReader<S> {
    inner: S,
    buf: BytesMut,
    eof: bool,
}

impl<S> LineReader<S> {
    /// Wraps a stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK),
            eof: false,
        }
    }

    /// Returns true once the stream has signalled end-of-data.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    /// Number of bytes read from the stream but not yet returned as a line.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Gets a mutable reference to the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Gets a reference to the underlying stream.
    pub const fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consumes the reader and returns the inner stream.
    ///
    /// Any buffered bytes are dropped; check [`buffered`](Self::buffered) first.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: AsyncRead + Unpin> LineReader<S> {
    /// Reads the next line with the CRLF removed.
    ///
    /// At end-of-data a partial line is returned as-is, and after that an
    /// empty vector, which callers treat as the connection being closed. Use
    /// [`is_eof`](Self::is_eof) to tell that apart from an empty line.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or a line holds more than
    /// [`MAX_LINE_LENGTH`] bytes before its CRLF. The limit applies the same
    /// way however the bytes are split across reads.
    pub async fn read_line(&mut self) -> Result<Vec<u8>> {
        loop {
            if let Some(pos) = find_crlf(&self.buf) {
                if pos > MAX_LINE_LENGTH {
                    return Err(Error::LineTooLong(MAX_LINE_LENGTH));
                }
                let line = self.buf.split_to(pos + 2);
                return Ok(line[..pos].to_vec());
            }

            // A trailing CR may be the first half of the delimiter.
            let pending = self.buf.len() - usize::from(self.buf.ends_with(b"\r"));
            if pending > MAX_LINE_LENGTH {
                return Err(Error::LineTooLong(MAX_LINE_LENGTH));
            }

            if self.eof {
                if self.buf.len() > MAX_LINE_LENGTH {
                    return Err(Error::LineTooLong(MAX_LINE_LENGTH));
                }
                return Ok(self.buf.split().to_vec());
            }

            self.buf.reserve(READ_CHUNK);
            if self.inner.read_buf(&mut self.buf).await? == 0 {
                self.eof = true;
            }
        }
    }
}

/// Finds the position of CRLF in a buffer.
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tokio_test::io::Builder;

    #[test]
    fn test_find_crlf() {
        assert_eq!(find_crlf(b"hello\r\n"), Some(5));
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b"no newline"), None);
        assert_eq!(find_crlf(b"just\n"), None);
        assert_eq!(find_crlf(b"just\r"), None);
    }

    #[tokio::test]
    async fn test_two_lines_in_one_read() {
        let mock = Builder::new().read(b"foo\r\nbar\r\n").build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.read_line().await.unwrap(), b"foo");
        assert_eq!(reader.read_line().await.unwrap(), b"bar");
    }

    #[tokio::test]
    async fn test_partial_line_then_close() {
        let mock = Builder::new().read(b"partial").build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.read_line().await.unwrap(), b"partial");
        assert!(reader.is_eof());
        assert!(reader.read_line().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_close_on_empty_buffer() {
        let mock = Builder::new().build();
        let mut reader = LineReader::new(mock);

        assert!(reader.read_line().await.unwrap().is_empty());
        assert!(reader.is_eof());
    }

    #[tokio::test]
    async fn test_delimiter_split_across_reads() {
        let mock = Builder::new()
            .read(b"250 O")
            .read(b"K\r")
            .read(b"\n220 next\r\n")
            .build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.read_line().await.unwrap(), b"250 OK");
        assert_eq!(reader.buffered(), 10);
        assert_eq!(reader.read_line().await.unwrap(), b"220 next");
        assert_eq!(reader.buffered(), 0);
    }

    #[tokio::test]
    async fn test_empty_line_is_not_eof() {
        let mock = Builder::new().read(b"\r\nx\r\n").build();
        let mut reader = LineReader::new(mock);

        assert!(reader.read_line().await.unwrap().is_empty());
        assert!(!reader.is_eof());
        assert_eq!(reader.read_line().await.unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_bare_lf_is_not_a_delimiter() {
        let mock = Builder::new().read(b"a\nb\r\n").build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.read_line().await.unwrap(), b"a\nb");
    }

    #[tokio::test]
    async fn test_line_length_limit() {
        // One byte over the limit, so the whole script is consumed
        let long_line = "A".repeat(MAX_LINE_LENGTH + 1);
        let mock = Builder::new().read(long_line.as_bytes()).build();
        let mut reader = LineReader::new(mock);

        let result = reader.read_line().await;
        assert!(matches!(result, Err(Error::LineTooLong(MAX_LINE_LENGTH))));
    }

    #[tokio::test]
    async fn test_line_at_limit_with_delimiter_split() {
        let mut line = "A".repeat(MAX_LINE_LENGTH).into_bytes();
        line.push(b'\r');
        let mock = Builder::new().read(&line).read(b"\n").build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.read_line().await.unwrap().len(), MAX_LINE_LENGTH);
        assert_eq!(reader.buffered(), 0);
    }

    #[tokio::test]
    async fn test_line_at_limit_in_one_read() {
        let line = format!("{}\r\n", "A".repeat(MAX_LINE_LENGTH));
        let mock = Builder::new().read(line.as_bytes()).build();
        let mut reader = LineReader::new(mock);

        assert_eq!(reader.read_line().await.unwrap().len(), MAX_LINE_LENGTH);
    }

    #[tokio::test]
    async fn test_over_limit_line_with_delimiter_in_one_read() {
        let line = format!("{}\r\n", "A".repeat(5000));
        let mock = Builder::new().read(line.as_bytes()).build();
        let mut reader = LineReader::new(mock);

        let result = reader.read_line().await;
        assert!(matches!(result, Err(Error::LineTooLong(MAX_LINE_LENGTH))));

        // Drain what the reader did not pull so the mock script is complete
        let mut rest = Vec::new();
        reader.into_inner().read_to_end(&mut rest).await.unwrap();
    }

    #[tokio::test]
    async fn test_over_limit_partial_line_at_eof() {
        let mut line = "A".repeat(MAX_LINE_LENGTH).into_bytes();
        line.push(b'\r');
        let mock = Builder::new().read(&line).build();
        let mut reader = LineReader::new(mock);

        let result = reader.read_line().await;
        assert!(matches!(result, Err(Error::LineTooLong(MAX_LINE_LENGTH))));
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_lines(
            lines in proptest::collection::vec("[a-zA-Z0-9 ]{0,40}", 1..8),
            chunk in 1usize..16,
        ) {
            let wire: Vec<u8> = lines
                .iter()
                .flat_map(|l| format!("{l}\r\n").into_bytes())
                .collect();

            let mut builder = Builder::new();
            for piece in wire.chunks(chunk) {
                builder.read(piece);
            }
            let mock = builder.build();

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let read: Vec<Vec<u8>> = runtime.block_on(async {
                let mut reader = LineReader::new(mock);
                let mut out = Vec::new();
                for _ in 0..lines.len() {
                    out.push(reader.read_line().await.unwrap());
                }
                out
            });

            let expected: Vec<Vec<u8>> = lines.iter().map(|l| l.clone().into_bytes()).collect();
            prop_assert_eq!(read, expected);
        }
    }
}
