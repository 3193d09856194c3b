//! Repository for the `feedbacks` table.

use chrono::NaiveDate;
use formdesk_core::submission::{AcceptedAnswer, SubmissionQuestion};
use formdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::answer::Answer;
use crate::models::feedback::{DailyCountRow, Feedback, FeedbackSummary};
use crate::models::question::Question;
use crate::repositories::entry_repo::EntryRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, entry_id, submitted_at, created_at, updated_at";

const ANSWER_COLUMNS: &str = "id, feedback_id, question_id, value, created_at, updated_at";

const QUESTION_COLUMNS: &str = "id, entry_id, label, question_type, is_required, sort_order, \
    options, created_at, updated_at";

/// Result of storing a submission.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The feedback and its answers were written.
    Stored { feedback: Feedback, answers: Vec<Answer> },
    /// The entry's questions changed after the submission was validated;
    /// nothing was written.
    Stale,
}

/// Provides create, read and delete operations for feedback submissions.
pub struct FeedbackRepo;

impl FeedbackRepo {
    /// Store one submission and all of its answers atomically.
    ///
    /// `validated` is the question list the answers were checked against. It
    /// is compared with the entry's questions under a shared entry lock and
    /// [`SubmitOutcome::Stale`] is returned if they differ. Fails with
    /// `RowNotFound` if the entry was deleted.
    pub async fn create_with_answers(
        pool: &PgPool,
        entry_id: DbId,
        validated: &[SubmissionQuestion],
        answers: &[AcceptedAnswer],
    ) -> Result<SubmitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !EntryRepo::lock_shared(&mut tx, entry_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }

        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE entry_id = $1 ORDER BY id"
        );
        let current: Vec<Question> = sqlx::query_as(&query)
            .bind(entry_id)
            .fetch_all(&mut *tx)
            .await?;
        // A row the validator could not have seen never matches.
        let current: Vec<Option<SubmissionQuestion>> = current
            .iter()
            .map(|q| q.to_submission_question().ok())
            .collect();
        let mut expected: Vec<Option<SubmissionQuestion>> =
            validated.iter().cloned().map(Some).collect();
        expected.sort_by_key(|q| q.as_ref().map(|q| q.id));
        if current != expected {
            tracing::debug!(entry_id, "Questions changed before submission was stored");
            return Ok(SubmitOutcome::Stale);
        }

        let query = format!(
            "INSERT INTO feedbacks (entry_id, submitted_at) VALUES ($1, NOW()) RETURNING {COLUMNS}"
        );
        let feedback = sqlx::query_as::<_, Feedback>(&query)
            .bind(entry_id)
            .fetch_one(&mut *tx)
            .await?;

        let answer_query = format!(
            "INSERT INTO answers (feedback_id, question_id, value)
             VALUES ($1, $2, $3)
             RETURNING {ANSWER_COLUMNS}"
        );
        let mut stored = Vec::with_capacity(answers.len());
        for answer in answers {
            let row = sqlx::query_as::<_, Answer>(&answer_query)
                .bind(feedback.id)
                .bind(answer.question_id)
                .bind(&answer.value)
                .fetch_one(&mut *tx)
                .await?;
            stored.push(row);
        }

        tx.commit().await?;
        Ok(SubmitOutcome::Stored {
            feedback,
            answers: stored,
        })
    }

    /// One page of an entry's feedback, newest first.
    pub async fn list_by_entry(
        pool: &PgPool,
        entry_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FeedbackSummary>, sqlx::Error> {
        sqlx::query_as::<_, FeedbackSummary>(
            "SELECT f.id, f.entry_id, f.submitted_at, f.created_at, f.updated_at,
                    (SELECT COUNT(*) FROM answers a WHERE a.feedback_id = f.id) AS answer_count
             FROM feedbacks f
             WHERE f.entry_id = $1
             ORDER BY f.submitted_at DESC, f.id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(entry_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_entry(pool: &PgPool, entry_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feedbacks WHERE entry_id = $1")
            .bind(entry_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Find a feedback by id, scoped to its entry.
    pub async fn find_for_entry(
        pool: &PgPool,
        entry_id: DbId,
        id: DbId,
    ) -> Result<Option<Feedback>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feedbacks WHERE id = $1 AND entry_id = $2");
        sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .bind(entry_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a feedback (answers cascade). Returns `true` if a row was removed.
    pub async fn delete_for_entry(
        pool: &PgPool,
        entry_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1 AND entry_id = $2")
            .bind(id)
            .bind(entry_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Submission counts grouped by UTC calendar day, from `since` onwards.
    /// Days without submissions are absent.
    pub async fn daily_counts(
        pool: &PgPool,
        entry_id: DbId,
        since: NaiveDate,
    ) -> Result<Vec<DailyCountRow>, sqlx::Error> {
        sqlx::query_as::<_, DailyCountRow>(
            "SELECT (submitted_at AT TIME ZONE 'UTC')::DATE AS day, COUNT(*) AS count
             FROM feedbacks
             WHERE entry_id = $1
               AND submitted_at >= ($2::DATE)::TIMESTAMP AT TIME ZONE 'UTC'
             GROUP BY 1
             ORDER BY 1",
        )
        .bind(entry_id)
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
