use std::future::Future;
use std::pin::Pin;

use super::ServiceUnavailable;

pub type CompletionBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Seam between the request handlers and the completion client, so the
/// handlers can run against a stub in tests.
pub trait Summarizer: Send + Sync {
    /// Produces a summary for `text`. The caller has already validated the
    /// input bounds; the only observable failure is [`ServiceUnavailable`]
    /// once every attempt is exhausted.
    fn summarize<'a>(
        &'a self,
        text: &'a str,
    ) -> CompletionBoxFuture<'a, Result<String, ServiceUnavailable>>;

    /// Label persisted in the record's `model` column.
    fn provider_name(&self) -> &str;
}
