use super::DbClient;
use crate::db::models::{CategoryParams, ExamCategory};
use crate::Result;
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use tracing::{error, info};

/// DbClient helper functions for the exam_categories table
impl DbClient {
    pub async fn list_categories(&self) -> Result<Vec<ExamCategory>> {
        use crate::schema::exam_categories::dsl::*;

        let conn = &mut self.get_db_conn().await?;

        info!("Fetching list of exam categories");
        exam_categories
            .order(name.asc())
            .load::<ExamCategory>(conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch exam categories: {}", e);
                e.into()
            })
    }

    pub async fn get_category(&self, cid: &str) -> Result<ExamCategory> {
        use crate::schema::exam_categories::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        exam_categories
            .filter(id.eq(cid))
            .first::<ExamCategory>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn insert_category(&self, category: &ExamCategory) -> Result<usize> {
        use crate::schema::exam_categories::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::insert_into(exam_categories)
            .values(category)
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn update_category(&self, cid: &str, params: &CategoryParams) -> Result<usize> {
        use crate::schema::exam_categories::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::update(exam_categories)
            .filter(id.eq(cid))
            .set((
                name.eq(params.name.trim()),
                description.eq(params.description.trim()),
            ))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_category(&self, cid: &str) -> Result<usize> {
        use crate::schema::exam_categories::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::delete(exam_categories.filter(id.eq(cid)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// Number of exams still referencing a category; deletion is refused
    /// while this is non-zero
    pub async fn count_exams_in_category(&self, cid: &str) -> Result<i64> {
        use crate::schema::exams::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        exams
            .filter(category_id.eq(cid))
            .count()
            .get_result::<i64>(conn)
            .await
            .map_err(Into::into)
    }
}
