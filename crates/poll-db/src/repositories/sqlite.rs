//! SQLite implementation of PollRepository

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::instrument;

use poll_core::entities::{Answer, Poll, Response};
use poll_core::error::DomainError;
use poll_core::traits::{PollRepository, RepoResult};
use poll_core::value_objects::PollId;

use crate::mappers::{AnswerInsert, PollInsert, ResponseInsert};
use crate::models::{AnswerModel, PollModel, ResponseModel};

use super::error::{map_db_error, map_foreign_key_violation, map_unique_violation};

/// SQLite implementation of PollRepository
#[derive(Clone)]
pub struct SqlitePollRepository {
    pool: SqlitePool,
}

impl SqlitePollRepository {
    /// Create a new SqlitePollRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollRepository for SqlitePollRepository {
    #[instrument(skip(self))]
    async fn find(&self, id: &PollId) -> RepoResult<Option<Poll>> {
        let result = sqlx::query_as::<_, PollModel>(
            r#"
            SELECT room_id, event_id, topic, kind, reply_event_id
            FROM polls
            WHERE room_id = ? AND event_id = ?
            "#,
        )
        .bind(id.room_id())
        .bind(id.event_id())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Poll::from))
    }

    #[instrument(skip(self))]
    async fn create(&self, poll: &Poll) -> RepoResult<()> {
        let insert = PollInsert::new(poll);

        sqlx::query(
            r#"
            INSERT INTO polls (room_id, event_id, topic, kind, reply_event_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(insert.room_id)
        .bind(insert.event_id)
        .bind(insert.topic)
        .bind(insert.kind)
        .bind(insert.reply_event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::PollAlreadyExists(poll.id.clone())))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_reply_event_id(&self, id: &PollId, reply_event_id: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE polls SET reply_event_id = ?
            WHERE room_id = ? AND event_id = ?
            "#,
        )
        .bind(reply_event_id)
        .bind(id.room_id())
        .bind(id.event_id())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PollNotFound(id.clone()));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &PollId) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Children first; the schema cascade is not relied upon
        sqlx::query("DELETE FROM responses WHERE room_id = ? AND reference_id = ?")
            .bind(id.room_id())
            .bind(id.event_id())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("DELETE FROM answers WHERE room_id = ? AND reference_id = ?")
            .bind(id.room_id())
            .bind(id.event_id())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query("DELETE FROM polls WHERE room_id = ? AND event_id = ?")
            .bind(id.room_id())
            .bind(id.event_id())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, answers), fields(count = answers.len()))]
    async fn add_answers(&self, answers: &[Answer]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        for answer in answers {
            let insert = AnswerInsert::new(answer);

            sqlx::query(
                r#"
                INSERT INTO answers (answer, answer_hash, room_id, reference_id, position)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(insert.answer)
            .bind(insert.answer_hash)
            .bind(insert.room_id)
            .bind(insert.reference_id)
            .bind(insert.position)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, || DomainError::DuplicateAnswer {
                    poll_id: answer.poll_id.clone(),
                    answer_hash: answer.answer_hash.clone(),
                })
            })?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_answers(&self, id: &PollId) -> RepoResult<Vec<Answer>> {
        let results = sqlx::query_as::<_, AnswerModel>(
            r#"
            SELECT answer, answer_hash, room_id, reference_id, position
            FROM answers
            WHERE room_id = ? AND reference_id = ?
            ORDER BY position
            "#,
        )
        .bind(id.room_id())
        .bind(id.event_id())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Answer::from).collect())
    }

    #[instrument(skip(self))]
    async fn upsert_response(&self, response: &Response) -> RepoResult<()> {
        let insert = ResponseInsert::new(response);

        sqlx::query(
            r#"
            INSERT INTO responses (response, "user", room_id, reference_id)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (room_id, reference_id, "user") DO UPDATE SET response = excluded.response
            "#,
        )
        .bind(insert.response)
        .bind(insert.user)
        .bind(insert.room_id)
        .bind(insert.reference_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_foreign_key_violation(e, || DomainError::UnknownAnswer {
                poll_id: response.poll_id.clone(),
                answer_hash: response.answer_hash.clone(),
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_responses(&self, id: &PollId) -> RepoResult<Vec<Response>> {
        let results = sqlx::query_as::<_, ResponseModel>(
            r#"
            SELECT response, "user", room_id, reference_id
            FROM responses
            WHERE room_id = ? AND reference_id = ?
            ORDER BY "user"
            "#,
        )
        .bind(id.room_id())
        .bind(id.event_id())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Response::from).collect())
    }
}
