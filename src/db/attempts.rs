use chrono::NaiveDateTime;

use super::DbClient;
use crate::db::models::{AttemptAnswer, AttemptStatus, AttemptSummary, TestAttempt};
use crate::Result;
use diesel::upsert::excluded;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::RunQueryDsl;
use tracing::info;

/// DbClient helper functions for the test_attempts and attempt_answers tables
impl DbClient {
    pub async fn insert_attempt(&self, attempt: &TestAttempt) -> Result<usize> {
        use crate::schema::test_attempts::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::insert_into(test_attempts)
            .values(attempt)
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn get_attempt(&self, aid: &str) -> Result<TestAttempt> {
        use crate::schema::test_attempts::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        test_attempts
            .filter(id.eq(aid))
            .first::<TestAttempt>(conn)
            .await
            .map_err(Into::into)
    }

    /// The caller's running attempt for an exam, if any. A user never holds
    /// two in-progress attempts for the same exam.
    pub async fn find_active_attempt(&self, uid: &str, eid: &str) -> Result<Option<TestAttempt>> {
        use crate::schema::test_attempts::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        test_attempts
            .filter(user_id.eq(uid))
            .filter(exam_id.eq(eid))
            .filter(status.eq(String::from(AttemptStatus::InProgress)))
            .first::<TestAttempt>(conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    /// Records an answer, replacing any earlier answer to the same question
    pub async fn upsert_answer(&self, answer: &AttemptAnswer) -> Result<usize> {
        use crate::schema::attempt_answers::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::insert_into(attempt_answers)
            .values(answer)
            .on_conflict((attempt_id, question_id))
            .do_update()
            .set((
                selected_option.eq(excluded(selected_option)),
                is_correct.eq(excluded(is_correct)),
                answered_at.eq(excluded(answered_at)),
            ))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn get_answers_for_attempt(&self, aid: &str) -> Result<Vec<AttemptAnswer>> {
        use crate::schema::attempt_answers::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        attempt_answers
            .filter(attempt_id.eq(aid))
            .order(answered_at.asc())
            .load::<AttemptAnswer>(conn)
            .await
            .map_err(Into::into)
    }

    /// Freezes an attempt's outcome. Status, score and counters never
    /// change again after this write.
    pub async fn finalize_attempt(
        &self,
        aid: &str,
        final_status: AttemptStatus,
        final_score: i32,
        correct: i32,
        answered: i32,
        finished_at: NaiveDateTime,
    ) -> Result<usize> {
        use crate::schema::test_attempts::dsl::*;
        let conn = &mut self.get_db_conn().await?;

        info!("Finalizing attempt {} as {:?}", aid, final_status);
        diesel::update(test_attempts)
            .filter(id.eq(aid))
            .set((
                status.eq(String::from(final_status)),
                score.eq(Some(final_score)),
                correct_count.eq(correct),
                answered_count.eq(answered),
                submitted_at.eq(Some(finished_at)),
            ))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// The caller's attempt history, newest first, with exam titles
    pub async fn list_attempts_for_user(&self, uid: &str) -> Result<Vec<AttemptSummary>> {
        use crate::schema::exams;
        use crate::schema::test_attempts::dsl::*;

        let conn = &mut self.get_db_conn().await?;

        let rows = test_attempts
            .inner_join(exams::table)
            .filter(user_id.eq(uid))
            .order(started_at.desc())
            .select((crate::schema::test_attempts::all_columns, exams::title))
            .load::<(TestAttempt, String)>(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(attempt, exam_title)| AttemptSummary {
                attempt_id: attempt.id,
                exam_id: attempt.exam_id,
                exam_title,
                status: attempt.status,
                score: attempt.score,
                total_marks: attempt.total_marks,
                started_at: attempt.started_at,
                submitted_at: attempt.submitted_at,
            })
            .collect())
    }

    /// In-progress attempts whose deadline has passed, for the sweeper
    pub async fn get_overdue_attempts(&self, now: NaiveDateTime) -> Result<Vec<TestAttempt>> {
        use crate::schema::test_attempts::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        test_attempts
            .filter(status.eq(String::from(AttemptStatus::InProgress)))
            .filter(deadline_at.lt(now))
            .load::<TestAttempt>(conn)
            .await
            .map_err(Into::into)
    }
}
