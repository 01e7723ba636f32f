//! Newline-delimited JSON-RPC over stdin/stdout.

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use super::protocol::{error_response, RpcError};
use super::McpServer;

/// Serves the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(server: McpServer) -> std::io::Result<()> {
    serve_lines(server, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Serves any line-oriented reader/writer pair until the reader hits EOF.
///
/// Each input line is one JSON-RPC message; each response is written as a
/// single line.
pub async fn serve_lines<R, W>(server: McpServer, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    info!("Serving MCP over stdio");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let responses = match serde_json::from_str::<Value>(line) {
            Ok(incoming) => server.handle_message(incoming).await,
            Err(err) => {
                warn!(error = %err, "Unparseable message");
                vec![error_response(Value::Null, RpcError::parse_error(format!("Parse error: {err}")))]
            }
        };

        for response in responses {
            let mut encoded = response.to_string();
            encoded.push('\n');
            writer.write_all(encoded.as_bytes()).await?;
        }
        writer.flush().await?;
    }

    debug!("stdin closed");
    Ok(())
}
