use sqlx::SqlitePool;

use crate::models::summary::Summary;

pub async fn create_summary(pool: &SqlitePool, data: &Summary) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO summaries (id, input_text, summary_text, model, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&data.id)
    .bind(&data.input_text)
    .bind(&data.summary_text)
    .bind(&data.model)
    .bind(&data.created_at)
    .bind(&data.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_summary_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Summary>, sqlx::Error> {
    sqlx::query_as::<_, Summary>("SELECT * FROM summaries WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Overwrites the summary text and refreshes the update timestamp. Returns
/// the number of rows touched (0 when the id does not exist).
pub async fn update_summary_text(
    pool: &SqlitePool,
    id: &str,
    summary_text: &str,
    updated_at: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE summaries SET summary_text = ?, updated_at = ? WHERE id = ?")
        .bind(summary_text)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_summary(pool: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM summaries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn sample() -> Summary {
        Summary::new(
            "a reasonably long block of input text".to_string(),
            "a short summary".to_string(),
            "groq".to_string(),
        )
    }

    #[tokio::test]
    async fn create_then_get_round_trips_the_record() {
        let pool = db::connect_in_memory().await;
        let record = sample();

        create_summary(&pool, &record).await.expect("insert");
        let fetched = get_summary_by_id(&pool, &record.id)
            .await
            .expect("select")
            .expect("record should exist");

        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.input_text, record.input_text);
        assert_eq!(fetched.summary_text, record.summary_text);
        assert_eq!(fetched.model, "groq");
        assert_eq!(fetched.created_at, record.created_at);
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let pool = db::connect_in_memory().await;
        let fetched = get_summary_by_id(&pool, "missing").await.expect("select");
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn update_overwrites_text_and_timestamp_only() {
        let pool = db::connect_in_memory().await;
        let record = sample();
        create_summary(&pool, &record).await.expect("insert");

        let touched = update_summary_text(&pool, &record.id, "an edited summary", "2030-01-01T00:00:00+00:00")
            .await
            .expect("update");
        assert_eq!(touched, 1);

        let fetched = get_summary_by_id(&pool, &record.id)
            .await
            .expect("select")
            .expect("record should exist");
        assert_eq!(fetched.summary_text, "an edited summary");
        assert_eq!(fetched.updated_at, "2030-01-01T00:00:00+00:00");
        assert_eq!(fetched.created_at, record.created_at);
        assert_eq!(fetched.input_text, record.input_text);
    }

    #[tokio::test]
    async fn update_reports_zero_rows_for_unknown_id() {
        let pool = db::connect_in_memory().await;
        let touched = update_summary_text(&pool, "missing", "an edited summary", "2030-01-01T00:00:00+00:00")
            .await
            .expect("update");
        assert_eq!(touched, 0);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let pool = db::connect_in_memory().await;
        let record = sample();
        create_summary(&pool, &record).await.expect("insert");

        assert_eq!(delete_summary(&pool, &record.id).await.expect("delete"), 1);
        assert!(get_summary_by_id(&pool, &record.id)
            .await
            .expect("select")
            .is_none());
        assert_eq!(delete_summary(&pool, &record.id).await.expect("delete"), 0);
    }
}
