//! Repository for the `questions` table.
//!
//! Every mutation that changes how many questions an entry has also
//! recomputes the entry's status, inside the same transaction, with the entry
//! row locked. Order values are kept contiguous (`0..n`).

use formdesk_core::question::{is_permutation_of, next_sort_order, QuestionFields};
use formdesk_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::question::Question;
use crate::models::status::EntryStatus;
use crate::repositories::entry_repo::EntryRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, entry_id, label, question_type, is_required, sort_order, options, \
    created_at, updated_at";

/// Result of a reorder attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// The new order was written.
    Applied,
    /// The entry's question set changed since the caller validated the list;
    /// nothing was written.
    Stale,
}

/// Provides CRUD and ordering operations for questions.
pub struct QuestionRepo;

impl QuestionRepo {
    /// All questions of an entry in display order.
    pub async fn list_by_entry(pool: &PgPool, entry_id: DbId) -> Result<Vec<Question>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM questions WHERE entry_id = $1 ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Question>(&query)
            .bind(entry_id)
            .fetch_all(pool)
            .await
    }

    /// Ids of an entry's questions in display order.
    pub async fn list_ids(pool: &PgPool, entry_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM questions WHERE entry_id = $1 ORDER BY sort_order ASC, id ASC",
        )
        .bind(entry_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Append a question after the current last one and publish the entry.
    ///
    /// Fails with `RowNotFound` if the entry was deleted concurrently.
    pub async fn create(
        pool: &PgPool,
        entry_id: DbId,
        fields: &QuestionFields,
    ) -> Result<(Question, EntryStatus), sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EntryRepo::lock(&mut tx, entry_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }

        let (max_order,): (Option<i32>,) =
            sqlx::query_as("SELECT MAX(sort_order) FROM questions WHERE entry_id = $1")
                .bind(entry_id)
                .fetch_one(&mut *tx)
                .await?;

        let query = format!(
            "INSERT INTO questions (entry_id, label, question_type, is_required, sort_order, options)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let question = sqlx::query_as::<_, Question>(&query)
            .bind(entry_id)
            .bind(&fields.label)
            .bind(fields.question_type.as_str())
            .bind(fields.is_required)
            .bind(next_sort_order(max_order))
            .bind(options_param(fields))
            .fetch_one(&mut *tx)
            .await?;

        let status = EntryRepo::sync_status(&mut tx, entry_id).await?;

        tx.commit().await?;
        Ok((question, status))
    }

    /// Overwrite label, type, required flag and options. Order is unchanged.
    ///
    /// Runs under the entry lock so an in-flight submission sees either the
    /// old or the new rules. Returns `None` if the question does not exist on
    /// this entry.
    pub async fn update(
        pool: &PgPool,
        entry_id: DbId,
        id: DbId,
        fields: &QuestionFields,
    ) -> Result<Option<Question>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EntryRepo::lock(&mut tx, entry_id).await? {
            return Ok(None);
        }

        let query = format!(
            "UPDATE questions SET
                label = $3,
                question_type = $4,
                is_required = $5,
                options = $6
             WHERE id = $1 AND entry_id = $2
             RETURNING {COLUMNS}"
        );
        let question = sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .bind(entry_id)
            .bind(&fields.label)
            .bind(fields.question_type.as_str())
            .bind(fields.is_required)
            .bind(options_param(fields))
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(question)
    }

    /// Delete a question, close the gap in the order sequence and recompute
    /// the entry's status.
    ///
    /// Returns `None` (and writes nothing) if the question does not exist on
    /// this entry.
    pub async fn delete(
        pool: &PgPool,
        entry_id: DbId,
        id: DbId,
    ) -> Result<Option<EntryStatus>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EntryRepo::lock(&mut tx, entry_id).await? {
            return Ok(None);
        }

        let deleted = sqlx::query("DELETE FROM questions WHERE id = $1 AND entry_id = $2")
            .bind(id)
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Ok(None);
        }

        Self::renumber_inner(&mut tx, entry_id).await?;
        let status = EntryRepo::sync_status(&mut tx, entry_id).await?;

        tx.commit().await?;
        Ok(Some(status))
    }

    /// Assign order values from the position of each id in `ordered_ids`.
    ///
    /// The caller validates the list first; the check is repeated under the
    /// entry lock and reports [`ReorderOutcome::Stale`] if questions were
    /// added or removed in between.
    pub async fn reorder(
        pool: &PgPool,
        entry_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<ReorderOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EntryRepo::lock(&mut tx, entry_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }

        let current: Vec<(DbId,)> = sqlx::query_as("SELECT id FROM questions WHERE entry_id = $1")
            .bind(entry_id)
            .fetch_all(&mut *tx)
            .await?;
        let current: Vec<DbId> = current.into_iter().map(|(id,)| id).collect();

        if !is_permutation_of(&current, ordered_ids) {
            tracing::debug!(entry_id, "Question set changed before reorder was applied");
            return Ok(ReorderOutcome::Stale);
        }

        sqlx::query(
            "UPDATE questions q SET sort_order = (o.position - 1)::INTEGER
             FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS o(id, position)
             WHERE q.id = o.id AND q.entry_id = $1",
        )
        .bind(entry_id)
        .bind(ordered_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ReorderOutcome::Applied)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Rewrite order values to `0..n`, keeping the relative order.
    async fn renumber_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE questions q SET sort_order = r.new_order
             FROM (
                 SELECT id, (ROW_NUMBER() OVER (ORDER BY sort_order, id) - 1)::INTEGER AS new_order
                 FROM questions
                 WHERE entry_id = $1
             ) r
             WHERE q.id = r.id AND q.sort_order <> r.new_order",
        )
        .bind(entry_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

/// Options column value: a JSON array for multiple-choice questions with at
/// least one option, otherwise NULL.
fn options_param(fields: &QuestionFields) -> Option<Json<&Vec<String>>> {
    fields
        .options
        .as_ref()
        .filter(|o| fields.question_type.has_options() && !o.is_empty())
        .map(Json)
}
