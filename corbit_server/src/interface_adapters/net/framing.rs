// `;`-delimited message framing over a byte stream.

use std::{fmt, io};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const DELIMITER: u8 = b';';
const READ_CHUNK: usize = 4096;
/// Longest message accepted by `FrameReader::new`, delimiter excluded.
pub const MAX_FRAME_LEN: usize = 1 << 20;

#[derive(Debug)]
pub enum FrameError {
    Io(io::Error),
    // End of stream before a delimiter arrived.
    Closed,
    Utf8(std::string::FromUtf8Error),
    // Message grew past the reader's limit; holds the limit.
    TooLong(usize),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Io(e) => write!(f, "frame io error: {e}"),
            FrameError::Closed => write!(f, "stream closed before message delimiter"),
            FrameError::Utf8(e) => write!(f, "message is not valid utf-8: {e}"),
            FrameError::TooLong(max) => write!(f, "message exceeds {max} bytes"),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        FrameError::Io(e)
    }
}

/// Reads whole messages from `R`, carrying any bytes past a delimiter over to
/// the next call.
pub struct FrameReader<R> {
    inner: R,
    buffer: Vec<u8>,
    max_len: usize,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limit(inner, MAX_FRAME_LEN)
    }

    pub fn with_limit(inner: R, max_len: usize) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            max_len,
        }
    }

    pub async fn read_message(&mut self) -> Result<String, FrameError> {
        let mut scanned = 0;
        loop {
            if let Some(pos) = self.buffer[scanned..]
                .iter()
                .position(|&b| b == DELIMITER)
            {
                let end = scanned + pos;
                let mut message: Vec<u8> = self.buffer.drain(..=end).collect();
                message.pop();
                if message.len() > self.max_len {
                    return Err(FrameError::TooLong(self.max_len));
                }
                return String::from_utf8(message).map_err(FrameError::Utf8);
            }
            if self.buffer.len() > self.max_len {
                self.buffer.clear();
                return Err(FrameError::TooLong(self.max_len));
            }
            scanned = self.buffer.len();

            let mut chunk = [0u8; READ_CHUNK];
            let n = self.inner.read(&mut chunk).await?;
            if n == 0 {
                return Err(FrameError::Closed);
            }
            self.buffer.extend_from_slice(&chunk[..n]);
        }
    }
}

/// Sends `payload` followed by the delimiter.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &str,
) -> Result<(), FrameError> {
    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.extend_from_slice(payload.as_bytes());
    frame.push(DELIMITER);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
