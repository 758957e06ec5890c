use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;

use super::AttemptError;

/// Splits complete `\n\n`-terminated SSE packets off the front of `buffer`
/// and parses their `data:` payloads as JSON. Incomplete trailing data stays
/// buffered for the next chunk. `[DONE]` sentinels and unparseable payloads
/// are skipped.
pub(crate) fn drain_sse_data_events(buffer: &mut String) -> Vec<Value> {
    let mut events = Vec::new();

    while let Some(end) = buffer.find("\n\n") {
        let packet: String = buffer.drain(..end + 2).collect();

        for line in packet.lines() {
            let Some(data) = line.trim().strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data == "[DONE]" {
                break;
            }
            if data.is_empty() {
                continue;
            }
            if let Ok(event) = serde_json::from_str::<Value>(data) {
                events.push(event);
            }
        }
    }

    events
}

/// Text fragment carried by one streamed chat-completion event, if any.
fn delta_content(event: &Value) -> Option<&str> {
    event
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
}

/// Consumes a streaming completion response to the end, concatenating the
/// delta fragments in arrival order. Events without a text payload
/// contribute nothing.
pub(crate) async fn collect_stream_content<S, E>(mut stream: S) -> Result<String, AttemptError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: ToString,
{
    let mut buffer = String::new();
    let mut content = String::new();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|err| AttemptError::Stream(err.to_string()))?;
        buffer.push_str(&String::from_utf8_lossy(&bytes));

        for event in drain_sse_data_events(&mut buffer) {
            if let Some(fragment) = delta_content(&event) {
                content.push_str(fragment);
            }
        }
    }

    Ok(content)
}
