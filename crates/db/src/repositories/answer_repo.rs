//! Repository for the `answers` table.

use formdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::answer::AnswerWithQuestion;

/// Read access to answers. Answers are written only through
/// `FeedbackRepo::create_with_answers` and removed by cascade.
pub struct AnswerRepo;

impl AnswerRepo {
    /// A feedback's answers with their question, in question order.
    pub async fn list_with_questions(
        pool: &PgPool,
        feedback_id: DbId,
    ) -> Result<Vec<AnswerWithQuestion>, sqlx::Error> {
        sqlx::query_as::<_, AnswerWithQuestion>(
            "SELECT a.id, a.feedback_id, a.question_id, a.value,
                    q.label AS question_label,
                    q.question_type,
                    q.sort_order AS question_order
             FROM answers a
             JOIN questions q ON q.id = a.question_id
             WHERE a.feedback_id = $1
             ORDER BY q.sort_order ASC, q.id ASC",
        )
        .bind(feedback_id)
        .fetch_all(pool)
        .await
    }
}
