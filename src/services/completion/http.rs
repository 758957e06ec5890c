use serde_json::json;

use super::sse::collect_stream_content;
use super::{AttemptError, CompletionBoxFuture, CompletionConfig, CompletionTransport};

// Fixed sampling parameters for every summarization call.
const TEMPERATURE: u32 = 1;
const TOP_P: u32 = 1;
const MAX_TOKENS: u32 = 1024;

const ERROR_BODY_LOG_LIMIT: usize = 2000;

/// The production transport: one streaming chat-completion POST per attempt.
pub(crate) struct HttpTransport {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl HttpTransport {
    pub(crate) fn new(config: CompletionConfig) -> HttpTransport {
        HttpTransport {
            http: reqwest::Client::new(),
            api_key: config.api_key,
            base_url: config.base_url,
            model: config.model,
        }
    }

    async fn stream_completion(&self, text: &str) -> Result<String, AttemptError> {
        let payload = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": text}],
            "temperature": TEMPERATURE,
            "top_p": TOP_P,
            "max_tokens": MAX_TOKENS,
            "stream": true,
        });

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| AttemptError::Request(err.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AttemptError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, ERROR_BODY_LOG_LIMIT),
            });
        }

        collect_stream_content(resp.bytes_stream()).await
    }
}

impl CompletionTransport for HttpTransport {
    fn complete<'a>(
        &'a self,
        text: &'a str,
    ) -> CompletionBoxFuture<'a, Result<String, AttemptError>> {
        Box::pin(self.stream_completion(text))
    }
}

fn truncate_body(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &value[..end])
}

#[cfg(test)]
mod tests {
    use super::truncate_body;

    #[test]
    fn truncates_long_bodies_with_suffix() {
        assert_eq!(truncate_body("abcdefgh", 4), "abcd...[truncated]");
        assert_eq!(truncate_body("abc", 4), "abc");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // each char is 3 bytes; a 4-byte cut must back up to a boundary
        let body = "日本語テキスト";
        let out = truncate_body(body, 4);
        assert_eq!(out, "日...[truncated]");
    }
}
