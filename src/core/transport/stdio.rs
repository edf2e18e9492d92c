//! STDIO transport implementation.
//!
//! Standard input/output transport for MCP: one JSON-RPC message per line.
//! Requests are handled strictly one at a time, so responses leave in the
//! order their requests arrived.

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, info, warn};

use super::TransportResult;
use super::jsonrpc::{Incoming, JsonRpcResponse, parse_message};
use crate::core::McpServer;

/// Largest accepted message, in bytes, excluding the newline.
pub const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until stdin is closed.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        serve(&server, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;

        info!("STDIO transport finished");
        Ok(())
    }
}

/// Serve newline-delimited JSON-RPC from `reader` to `writer`.
///
/// Returns `Ok(())` at end of input. Unparseable lines never end the loop;
/// only I/O failures on the streams do.
pub async fn serve<R, W>(server: &McpServer, reader: R, writer: W) -> TransportResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_with_limit(server, reader, writer, MAX_LINE_BYTES).await
}

/// Like [`serve`], dropping lines longer than `max_line_bytes`.
///
/// An over-long line is skipped without being buffered and is never
/// answered, since its request ID cannot be read.
pub async fn serve_with_limit<R, W>(
    server: &McpServer,
    mut reader: R,
    mut writer: W,
    max_line_bytes: usize,
) -> TransportResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    let limit = u64::try_from(max_line_bytes).unwrap_or(u64::MAX).saturating_add(1);

    loop {
        line.clear();
        if (&mut reader).take(limit).read_until(b'\n', &mut line).await? == 0 {
            debug!("Input stream closed");
            return Ok(());
        }

        if line.len() > max_line_bytes && line.last() != Some(&b'\n') {
            let skipped = line.len() + discard_line(&mut reader).await?;
            warn!("Dropping message of {} bytes (limit {})", skipped, max_line_bytes);
            continue;
        }

        let message = line.trim_ascii();
        if message.is_empty() {
            continue;
        }

        let response = match parse_message(message) {
            Incoming::Request { id, method, params } => {
                server.handle_request(id, &method, params).await
            }
            Incoming::Notification { method, .. } => {
                server.handle_notification(&method);
                continue;
            }
            Incoming::Malformed {
                id: Some(id),
                reason,
            } => {
                warn!("Rejecting malformed request {}: {}", id, reason);
                JsonRpcResponse::invalid_request(id, reason)
            }
            Incoming::Malformed { id: None, reason } => {
                warn!("Dropping unparseable message: {}", reason);
                continue;
            }
        };

        write_response(&mut writer, &response).await?;
    }
}

/// Consume input up to and including the next newline.
async fn discard_line<R>(reader: &mut R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut discarded = 0;
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(discarded);
        }
        let (consumed, done) = match buf.iter().position(|b| *b == b'\n') {
            Some(i) => (i + 1, true),
            None => (buf.len(), false),
        };
        reader.consume(consumed);
        discarded += consumed;
        if done {
            return Ok(discarded);
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = serde_json::to_vec(response)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}
