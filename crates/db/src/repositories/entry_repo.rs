//! Repository for the `entries` table.

use formdesk_core::entry::{EntryFields, EntrySort};
use formdesk_core::types::DbId;
use sqlx::PgPool;

use crate::models::entry::{Entry, EntryWithCount};
use crate::models::status::{EntryStatus, StatusId};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, slug, title, description, status_id, created_at, updated_at";

/// Same columns qualified with the `e` alias, for joined queries.
const E_COLUMNS: &str = "e.id, e.user_id, e.slug, e.title, e.description, e.status_id, \
    e.created_at, e.updated_at";

/// Provides CRUD operations for entries.
pub struct EntryRepo;

impl EntryRepo {
    /// Insert a new draft entry with the given slug.
    ///
    /// A slug collision surfaces as a unique violation on `uq_entries_slug`.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        slug: &str,
        fields: &EntryFields,
    ) -> Result<Entry, sqlx::Error> {
        let query = format!(
            "INSERT INTO entries (user_id, slug, title, description, status_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Entry>(&query)
            .bind(user_id)
            .bind(slug)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(EntryStatus::Draft.id())
            .fetch_one(pool)
            .await
    }

    /// Find an entry by slug regardless of owner (public form lookup).
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Entry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM entries WHERE slug = $1");
        sqlx::query_as::<_, Entry>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Find an entry by slug only if it belongs to `user_id`.
    pub async fn find_by_slug_for_owner(
        pool: &PgPool,
        slug: &str,
        user_id: DbId,
    ) -> Result<Option<Entry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM entries WHERE slug = $1 AND user_id = $2");
        sqlx::query_as::<_, Entry>(&query)
            .bind(slug)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// One page of an owner's entries with feedback counts.
    ///
    /// `pattern` is an already-escaped `ILIKE` pattern matched against title
    /// or description.
    pub async fn list_for_owner(
        pool: &PgPool,
        user_id: DbId,
        pattern: Option<&str>,
        sort: EntrySort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EntryWithCount>, sqlx::Error> {
        let order = order_clause(sort);
        let query = format!(
            "SELECT {E_COLUMNS},
                    (SELECT COUNT(*) FROM feedbacks f WHERE f.entry_id = e.id) AS feedback_count
             FROM entries e
             WHERE e.user_id = $1
               AND ($2::TEXT IS NULL OR e.title ILIKE $2 OR e.description ILIKE $2)
             ORDER BY {order}
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, EntryWithCount>(&query)
            .bind(user_id)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of an owner's entries matching `pattern`.
    pub async fn count_for_owner(
        pool: &PgPool,
        user_id: DbId,
        pattern: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM entries e
             WHERE e.user_id = $1
               AND ($2::TEXT IS NULL OR e.title ILIKE $2 OR e.description ILIKE $2)",
        )
        .bind(user_id)
        .bind(pattern)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Replace title, description and slug. Status is left untouched.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        slug: &str,
        fields: &EntryFields,
    ) -> Result<Option<Entry>, sqlx::Error> {
        let query = format!(
            "UPDATE entries SET
                slug = $2,
                title = $3,
                description = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Entry>(&query)
            .bind(id)
            .bind(slug)
            .bind(&fields.title)
            .bind(&fields.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete an entry; questions, feedback and answers go with it through
    /// `ON DELETE CASCADE`. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn question_count(pool: &PgPool, entry_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions WHERE entry_id = $1")
            .bind(entry_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn feedback_count(pool: &PgPool, entry_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM feedbacks WHERE entry_id = $1")
            .bind(entry_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Lock the entry row for the rest of the transaction so concurrent
    /// question mutations on the same entry run one after another.
    ///
    /// Returns `false` if the entry no longer exists.
    pub(crate) async fn lock(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM entries WHERE id = $1 FOR UPDATE")
            .bind(entry_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.is_some())
    }

    /// Take a shared lock on the entry row. Submissions hold it while they
    /// insert so question edits, which take the exclusive [`lock`], wait for
    /// them, while submissions to the same entry do not wait for each other.
    ///
    /// Returns `false` if the entry no longer exists.
    ///
    /// [`lock`]: EntryRepo::lock
    pub(crate) async fn lock_shared(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as("SELECT id FROM entries WHERE id = $1 FOR SHARE")
            .bind(entry_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.is_some())
    }

    /// Recompute the entry's status from its current question count.
    pub(crate) async fn sync_status(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry_id: DbId,
    ) -> Result<EntryStatus, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions WHERE entry_id = $1")
            .bind(entry_id)
            .fetch_one(&mut **tx)
            .await?;
        let status = EntryStatus::for_question_count(count);

        sqlx::query("UPDATE entries SET status_id = $2 WHERE id = $1 AND status_id <> $2")
            .bind(entry_id)
            .bind(StatusId::from(status))
            .execute(&mut **tx)
            .await?;
        Ok(status)
    }
}

/// `ORDER BY` clause for a list sort. Every variant ends on `id` so pages are
/// stable when the leading keys tie.
fn order_clause(sort: EntrySort) -> &'static str {
    match sort {
        EntrySort::Newest => "e.created_at DESC, e.id DESC",
        EntrySort::Oldest => "e.created_at ASC, e.id ASC",
        EntrySort::Popular => "feedback_count DESC, e.created_at DESC, e.id DESC",
    }
}
