use chrono::Utc;

use super::DbClient;
use crate::db::models::ProgressRecord;
use crate::Result;
use diesel::upsert::excluded;
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;

/// DbClient helper functions for the progress table
impl DbClient {
    /// Folds one finalized attempt's per-subject tally into the user's
    /// progress row. Counters only ever increase.
    pub async fn accumulate_progress(
        &self,
        uid: &str,
        subj: &str,
        attempts_delta: i32,
        answered_delta: i32,
        correct_delta: i32,
        time_delta_seconds: i64,
    ) -> Result<usize> {
        use crate::schema::progress::dsl::*;

        let conn = &mut self.get_db_conn().await?;

        let delta = ProgressRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: uid.to_string(),
            subject: subj.to_string(),
            attempts_count: attempts_delta,
            questions_answered: answered_delta,
            correct_answered: correct_delta,
            time_spent_seconds: time_delta_seconds,
            last_updated: Utc::now().naive_utc(),
        };

        diesel::insert_into(progress)
            .values(&delta)
            .on_conflict((user_id, subject))
            .do_update()
            .set((
                attempts_count.eq(attempts_count + excluded(attempts_count)),
                questions_answered.eq(questions_answered + excluded(questions_answered)),
                correct_answered.eq(correct_answered + excluded(correct_answered)),
                time_spent_seconds.eq(time_spent_seconds + excluded(time_spent_seconds)),
                last_updated.eq(excluded(last_updated)),
            ))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn get_progress_for_user(&self, uid: &str) -> Result<Vec<ProgressRecord>> {
        use crate::schema::progress::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        progress
            .filter(user_id.eq(uid))
            .order(subject.asc())
            .load::<ProgressRecord>(conn)
            .await
            .map_err(Into::into)
    }
}
