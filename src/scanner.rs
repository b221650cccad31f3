use crate::error::{ScanError, ScanResult};
use crate::models::Event;
use crate::render::{render, Palette};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Longest accepted input line, excluding its terminator.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Reads newline-delimited records and renders them one at a time.
pub struct Scanner<'a> {
    palette: &'a Palette,
    max_line_bytes: usize,
    cancel: CancellationToken,
}

impl<'a> Scanner<'a> {
    pub fn new(palette: &'a Palette, max_line_bytes: usize, cancel: CancellationToken) -> Self {
        Self {
            palette,
            max_line_bytes,
            cancel,
        }
    }

    /// Renders every line of `src` into `sink` until end of input or until
    /// cancellation is observed. Cancellation is checked after each rendered
    /// line; while waiting for input it is honoured too, in which case any
    /// bytes already received are rendered as a final line. Returns the number
    /// of lines rendered.
    pub async fn run<R, W>(&self, mut src: R, sink: &mut W) -> ScanResult<u64>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut buf = Vec::new();
        let mut lines = 0u64;

        loop {
            let more = tokio::select! {
                biased;
                read = read_line(&mut src, &mut buf, self.max_line_bytes) => read?,
                _ = self.cancel.cancelled() => {
                    if !buf.is_empty() {
                        lines += 1;
                        self.emit(&buf, lines, sink)?;
                    }
                    info!("Cancelled while waiting for input after {} lines", lines);
                    break;
                }
            };
            if !more {
                info!("Reached end of input after {} lines", lines);
                break;
            }
            lines += 1;
            self.emit(&buf, lines, sink)?;

            if self.cancel.is_cancelled() {
                info!("Cancelled after {} lines", lines);
                break;
            }
        }

        sink.flush()?;
        Ok(lines)
    }

    fn emit<W: Write>(&self, line: &[u8], number: u64, sink: &mut W) -> ScanResult<()> {
        let event = Event::parse(line);
        if !event.is_structured() {
            debug!("Line {} is not a JSON object, rendering as is", number);
        }
        for rendered in render(&event, self.palette) {
            writeln!(sink, "{}", rendered)?;
        }
        Ok(())
    }
}

/// Reads one line into `buf` without its `\n` or `\r\n` terminator. Returns
/// `false` at end of input. At most `limit + 1` bytes are buffered, so an
/// oversized line fails without being read in full.
async fn read_line<R>(src: &mut R, buf: &mut Vec<u8>, limit: usize) -> ScanResult<bool>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = (&mut *src)
        .take((limit as u64).saturating_add(1))
        .read_until(b'\n', buf)
        .await?;
    if read == 0 {
        return Ok(false);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    } else if buf.len() > limit {
        return Err(ScanError::LineTooLong { limit });
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(true)
}
