use super::DbClient;
use crate::db::models::User;
use crate::Result;
use diesel::{ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use tracing::info;

pub const PER_PAGE: i64 = 20;

/// DbClient helper functions for the users table
impl DbClient {
    pub async fn insert_user(&self, user: &User) -> Result<usize> {
        use crate::schema::users::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::insert_into(users)
            .values(user)
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn get_user(&self, uid: &str) -> Result<User> {
        use crate::schema::users::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        users
            .filter(id.eq(uid))
            .first::<User>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn get_user_by_email(&self, user_email: &str) -> Result<User> {
        use crate::schema::users::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        users
            .filter(email.eq(user_email))
            .first::<User>(conn)
            .await
            .map_err(Into::into)
    }

    /// Retrieves a page of users, newest first, with the total count
    pub async fn get_users_page(&self, page: i64) -> Result<(Vec<User>, i64)> {
        use crate::schema::users::dsl::*;

        // Ensure page is valid
        let page = page.max(1);
        let offset = (page - 1) * PER_PAGE;

        let conn = &mut self.get_db_conn().await?;

        let total = users.count().get_result::<i64>(conn).await?;

        info!("Fetching user page {} of {} total users", page, total);
        let page_rows = users
            .order(created_at.desc())
            .offset(offset)
            .limit(PER_PAGE)
            .load::<User>(conn)
            .await?;

        Ok((page_rows, total))
    }

    pub async fn update_user_role(&self, uid: &str, new_role: String) -> Result<usize> {
        use crate::schema::users::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::update(users)
            .filter(id.eq(uid))
            .set(role.eq(new_role))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_user(&self, uid: &str) -> Result<usize> {
        use crate::schema::users::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        diesel::delete(users.filter(id.eq(uid)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }
}
