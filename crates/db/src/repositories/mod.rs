//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Writes that touch more than one row run in
//! a single transaction.

pub mod answer_repo;
pub mod entry_repo;
pub mod feedback_repo;
pub mod question_repo;

pub use answer_repo::AnswerRepo;
pub use entry_repo::EntryRepo;
pub use feedback_repo::{FeedbackRepo, SubmitOutcome};
pub use question_repo::{QuestionRepo, ReorderOutcome};
