use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted input/summary pair. `id` and `created_at` are assigned at
/// construction and never change; `updated_at` is refreshed on every
/// mutation of the summary text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Summary {
    pub id: String,
    pub input_text: String,
    pub summary_text: String,
    pub model: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Summary {
    pub fn new(input_text: String, summary_text: String, model: String) -> Summary {
        let now = chrono::Utc::now().to_rfc3339();
        Summary {
            id: Uuid::new_v4().to_string(),
            input_text,
            summary_text,
            model,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
