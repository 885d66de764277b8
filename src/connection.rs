//! Line-framed transport
//!
//! Wraps one byte stream in a `LinesCodec` reader and writer. Reads yield one
//! line without its terminator (`\n` or `\r\n`); writes append `\n` and flush.
//! Reads are unbounded until a limit is set with `set_max_line_length`.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::error::RelayError;

/// Read half of a [`Connection`]
pub struct LineReader<S> {
    inner: FramedRead<ReadHalf<S>, LinesCodec>,
}

impl<S: AsyncRead> LineReader<S> {
    /// Read one line
    ///
    /// Returns `Ok(None)` at end-of-stream.
    pub async fn read_line(&mut self) -> Result<Option<String>, RelayError> {
        Ok(self.inner.next().await.transpose()?)
    }

    /// Make lines longer than `max` bytes a read error from now on
    ///
    /// Only call between lines; the decoder's scan position restarts.
    pub fn set_max_line_length(&mut self, max: usize) {
        *self.inner.decoder_mut() = LinesCodec::new_with_max_length(max);
    }
}

/// Write half of a [`Connection`]
pub struct LineWriter<S> {
    inner: FramedWrite<WriteHalf<S>, LinesCodec>,
}

impl<S: AsyncWrite> LineWriter<S> {
    /// Write one line followed by `\n`, then flush
    pub async fn write_line(&mut self, line: &str) -> Result<(), RelayError> {
        self.inner.send(line).await?;
        Ok(())
    }

    /// Flush and shut down the write direction of the transport
    ///
    /// Waits for the peer to accept anything still buffered.
    pub async fn shutdown(&mut self) -> Result<(), RelayError> {
        SinkExt::<&str>::close(&mut self.inner).await?;
        Ok(())
    }
}

/// One client transport with buffered line reading and writing
///
/// Owned by the handshake until the session starts, then split so the
/// inbound and outbound loops each own one direction.
pub struct Connection<S> {
    reader: LineReader<S>,
    writer: LineWriter<S>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite,
{
    /// Wrap a stream with no limit on line length
    pub fn new(stream: S) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: LineReader {
                inner: FramedRead::new(read_half, LinesCodec::new()),
            },
            writer: LineWriter {
                inner: FramedWrite::new(write_half, LinesCodec::new()),
            },
        }
    }

    pub async fn read_line(&mut self) -> Result<Option<String>, RelayError> {
        self.reader.read_line().await
    }

    pub async fn write_line(&mut self, line: &str) -> Result<(), RelayError> {
        self.writer.write_line(line).await
    }

    pub fn set_max_line_length(&mut self, max: usize) {
        self.reader.set_max_line_length(max);
    }

    pub async fn shutdown(&mut self) -> Result<(), RelayError> {
        self.writer.shutdown().await
    }

    /// Split into independently owned read and write halves
    pub fn into_split(self) -> (LineReader<S>, LineWriter<S>) {
        (self.reader, self.writer)
    }
}
