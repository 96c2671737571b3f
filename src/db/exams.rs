use std::collections::HashMap;

use super::DbClient;
use crate::db::models::{AttemptStatus, Exam, ExamSummary};
use crate::Result;
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use tracing::{error, info};

/// DbClient helper functions for the exams table
impl DbClient {
    /// Retrieves published exams, optionally filtered by category, with
    /// their question counts
    pub async fn get_published_exam_summaries(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ExamSummary>> {
        use crate::schema::exams::dsl::*;

        let conn = &mut self.get_db_conn().await?;

        info!("Fetching list of published exams");
        let rows = match category {
            Some(cid) => {
                exams
                    .filter(is_published.eq(true))
                    .filter(category_id.eq(cid))
                    .order(title.asc())
                    .load::<Exam>(conn)
                    .await
            }
            None => {
                exams
                    .filter(is_published.eq(true))
                    .order(title.asc())
                    .load::<Exam>(conn)
                    .await
            }
        }
        .map_err(|e| {
            error!("Failed to fetch published exams: {}", e);
            crate::errors::ApiError::from(e)
        })?;

        let counts: HashMap<String, i64> =
            self.get_exam_question_counts().await?.into_iter().collect();

        Ok(rows
            .into_iter()
            .map(|exam| {
                let count = counts.get(&exam.id).copied().unwrap_or(0);
                ExamSummary::from_exam(exam, count)
            })
            .collect())
    }

    pub async fn get_exam(&self, eid: &str) -> Result<Exam> {
        use crate::schema::exams::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        exams
            .filter(id.eq(eid))
            .first::<Exam>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn insert_exam(&self, exam: &Exam) -> Result<usize> {
        use crate::schema::exams::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::insert_into(exams)
            .values(exam)
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// Writes back a full exam row; the caller loads, mutates, then saves
    pub async fn update_exam(&self, exam: &Exam) -> Result<usize> {
        use crate::schema::exams::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::update(exams.filter(id.eq(&exam.id)))
            .set(exam)
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_exam(&self, eid: &str) -> Result<usize> {
        use crate::schema::exams::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::delete(exams.filter(id.eq(eid)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// Number of attempts referencing an exam; deletion is refused while
    /// this is non-zero
    pub async fn count_attempts_for_exam(&self, eid: &str) -> Result<i64> {
        use crate::schema::test_attempts::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        test_attempts
            .filter(exam_id.eq(eid))
            .count()
            .get_result::<i64>(conn)
            .await
            .map_err(Into::into)
    }

    /// Number of attempts currently running against an exam; question
    /// mutations are refused while this is non-zero
    pub async fn count_in_progress_attempts_for_exam(&self, eid: &str) -> Result<i64> {
        use crate::schema::test_attempts::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        test_attempts
            .filter(exam_id.eq(eid))
            .filter(status.eq(String::from(AttemptStatus::InProgress)))
            .count()
            .get_result::<i64>(conn)
            .await
            .map_err(Into::into)
    }
}
