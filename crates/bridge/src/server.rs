//! STDIO request loop.

use protocol::{ParseError, RejectedLine, Response, ResponseWriter, parse_line};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, BufReader};

use crate::Result;
use crate::dispatcher::Dispatcher;

/// Maximum accepted input line (1MB), not counting the line terminator.
pub const MAX_LINE_SIZE: usize = 1024 * 1024;

/// Room for the content plus a `\r\n` terminator.
const READ_LIMIT: u64 = MAX_LINE_SIZE as u64 + 2;

/// Counters reported when the input stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Lines answered with a response.
    pub responses: u64,
    /// Lines dropped because no id could be recovered.
    pub dropped: u64,
}

/// Reads requests line by line and writes one response per request.
///
/// Strictly sequential: the next line is not read until the current
/// request's response has been flushed.
pub struct Server {
    dispatcher: Dispatcher,
}

impl Server {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serve on the process's stdin/stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<ServeSummary> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.run(stdin, tokio::io::stdout()).await
    }

    /// Serve until `reader` reaches EOF.
    ///
    /// Unparseable lines are answered with an error when their id could be
    /// recovered, otherwise dropped. Only I/O errors on the streams end the
    /// loop early.
    pub async fn run<R, W>(&self, mut reader: R, writer: W) -> Result<ServeSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let writer = ResponseWriter::new(writer);
        let mut summary = ServeSummary::default();
        let mut buf = Vec::new();

        tracing::info!(tools = self.dispatcher.registry().len(), "serving on stdio");

        loop {
            let decoded = match read_line(&mut reader, &mut buf).await? {
                Line::Eof => break,
                Line::TooLong => Some(Err(RejectedLine::from(ParseError::LineTooLong {
                    max: MAX_LINE_SIZE,
                }))),
                Line::Content(len) => decode(&buf[..len]),
            };

            let response = match decoded {
                None => continue,
                Some(Ok(request)) => self.dispatcher.dispatch(request).await,
                Some(Err(RejectedLine { id: Some(id), error })) => {
                    tracing::warn!(%id, %error, "rejected request");
                    Response::failure(id, error.to_string())
                }
                Some(Err(RejectedLine { id: None, error })) => {
                    tracing::warn!(%error, "dropping line without a usable id");
                    summary.dropped += 1;
                    continue;
                }
            };

            writer.write(&response).await?;
            summary.responses += 1;
        }

        tracing::info!(
            responses = summary.responses,
            dropped = summary.dropped,
            "input closed"
        );
        Ok(summary)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Eof,
    /// Length of the line in the buffer, terminator excluded.
    Content(usize),
    /// Over [`MAX_LINE_SIZE`]; the rest of it has been discarded.
    TooLong,
}

/// Read one line into `buf`, never buffering more than [`READ_LIMIT`] bytes.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let read = (&mut *reader).take(READ_LIMIT).read_until(b'\n', buf).await?;
    if read == 0 {
        return Ok(Line::Eof);
    }

    if buf.last() != Some(&b'\n') {
        if read as u64 == READ_LIMIT {
            skip_line(reader).await?;
            return Ok(Line::TooLong);
        }
        // Final line without a terminator.
        return Ok(check_len(buf.len()));
    }

    let mut len = buf.len() - 1;
    if len > 0 && buf[len - 1] == b'\r' {
        len -= 1;
    }
    Ok(check_len(len))
}

fn check_len(len: usize) -> Line {
    if len > MAX_LINE_SIZE {
        Line::TooLong
    } else {
        Line::Content(len)
    }
}

/// Discard input up to and including the next `\n`.
async fn skip_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

/// `None` for blank lines.
fn decode(raw: &[u8]) -> Option<protocol::Result<protocol::Request>> {
    let Ok(line) = std::str::from_utf8(raw) else {
        return Some(Err(ParseError::InvalidJson.into()));
    };
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(parse_line(line))
}
