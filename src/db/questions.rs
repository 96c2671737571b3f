use super::DbClient;
use crate::db::models::Question;
use crate::Result;
use diesel::dsl::count_star;
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

/// DbClient helper functions for the questions table
impl DbClient {
    pub async fn get_questions_for_exam(&self, eid: &str) -> Result<Vec<Question>> {
        use crate::schema::questions::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        questions
            .filter(exam_id.eq(eid))
            .order(created_at.asc())
            .load::<Question>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn get_question(&self, qid: &str) -> Result<Question> {
        use crate::schema::questions::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        questions
            .filter(id.eq(qid))
            .first::<Question>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn insert_question(&self, question: &Question) -> Result<usize> {
        use crate::schema::questions::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::insert_into(questions)
            .values(question)
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// Writes back a full question row; the caller loads, mutates, then saves
    pub async fn update_question(&self, question: &Question) -> Result<usize> {
        use crate::schema::questions::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::update(questions.filter(id.eq(&question.id)))
            .set(question)
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_question(&self, qid: &str) -> Result<usize> {
        use crate::schema::questions::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::delete(questions.filter(id.eq(qid)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn count_questions_for_exam(&self, eid: &str) -> Result<i64> {
        use crate::schema::questions::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        questions
            .filter(exam_id.eq(eid))
            .count()
            .get_result::<i64>(conn)
            .await
            .map_err(Into::into)
    }

    /// Number of recorded answers referencing a question; deletion is
    /// refused while this is non-zero
    pub async fn count_answers_for_question(&self, qid: &str) -> Result<i64> {
        use crate::schema::attempt_answers::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        attempt_answers
            .filter(question_id.eq(qid))
            .count()
            .get_result::<i64>(conn)
            .await
            .map_err(Into::into)
    }

    /// Question counts grouped by exam, for the exam listing
    pub async fn get_exam_question_counts(&self) -> Result<Vec<(String, i64)>> {
        use crate::schema::questions::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        questions
            .group_by(exam_id)
            .select((exam_id, count_star()))
            .load::<(String, i64)>(conn)
            .await
            .map_err(Into::into)
    }
}
