use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::models::{ActivityRow, GroupRow, MemberRow, PreferenceRow};
use super::{DbPool, GroupStore};
use crate::models::group::{
    GroupPreference, GroupRecord, GroupState, GroupSummary, Member, PreferenceSubmission,
    SubmissionProgress, SubmissionResult,
};
use crate::models::travel::{Activity, Recommendation};

const GROUP_COLUMNS: &str =
    "g.id, g.name, g.code, g.state, g.recommendations, g.trip_start_date, g.trip_end_date";

pub struct Repository {
    pub pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupStore for Repository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool.get_pool()).await?;
        Ok(())
    }

    async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<GroupSummary>> {
        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            r#"SELECT {GROUP_COLUMNS}
               FROM groups g
               JOIN user_groups ug ON ug.group_id = g.id
               WHERE ug.user_id = $1
               ORDER BY g.created_at"#
        ))
        .bind(user_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        let group_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let members = sqlx::query_as::<_, MemberRow>(
            r#"SELECT ug.group_id, u.id, u.first_name, u.last_name
               FROM user_groups ug
               JOIN users u ON u.id = ug.user_id
               WHERE ug.group_id = ANY($1)
               ORDER BY ug.joined_at"#,
        )
        .bind(&group_ids)
        .fetch_all(self.pool.get_pool())
        .await?;

        let mut by_group: HashMap<Uuid, Vec<Member>> = HashMap::new();
        for row in members {
            by_group.entry(row.group_id).or_default().push(row.into());
        }

        debug!("User {} is in {} groups", user_id, rows.len());

        rows.into_iter()
            .map(|row| {
                let users = by_group.remove(&row.id).unwrap_or_default();
                Ok(GroupSummary { group: row.into_record()?, users })
            })
            .collect()
    }

    async fn get_group(&self, group_id: Uuid) -> Result<Option<GroupRecord>> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups g WHERE g.id = $1"
        ))
        .bind(group_id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        row.map(GroupRow::into_record).transpose()
    }

    async fn join_by_code(&self, code: &str, user_id: Uuid) -> Result<Option<GroupRecord>> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups g WHERE g.code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool.get_pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let inserted = sqlx::query(
            r#"INSERT INTO user_groups (user_id, group_id)
               VALUES ($1, $2)
               ON CONFLICT (user_id, group_id) DO NOTHING"#,
        )
        .bind(user_id)
        .bind(row.id)
        .execute(self.pool.get_pool())
        .await?;

        if inserted.rows_affected() == 0 {
            debug!("User {} already in group {}", user_id, row.id);
        }

        row.into_record().map(Some)
    }

    async fn submit_preferences(
        &self,
        group_id: Uuid,
        submission: &PreferenceSubmission,
    ) -> Result<SubmissionResult> {
        let mut tx = self.pool.get_pool().begin().await?;

        // Held until commit: concurrent submitters and the recommendation
        // transition serialize on this row
        let state = sqlx::query_scalar::<_, String>("SELECT state FROM groups WHERE id = $1 FOR UPDATE")
            .bind(group_id)
            .fetch_optional(&mut *tx)
            .await?;

        let state: GroupState = match state {
            Some(state) => state.parse()?,
            None => return Ok(SubmissionResult::GroupMissing),
        };
        if state != GroupState::Preferences {
            return Ok(SubmissionResult::Closed(state));
        }

        let is_member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_groups WHERE group_id = $1 AND user_id = $2)",
        )
        .bind(group_id)
        .bind(submission.user_id)
        .fetch_one(&mut *tx)
        .await?;
        if !is_member {
            return Ok(SubmissionResult::NotMember);
        }

        sqlx::query(
            r#"INSERT INTO group_preferences (group_id, user_id, images, songs, palette)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (group_id, user_id) DO UPDATE
               SET images = EXCLUDED.images,
                   songs = EXCLUDED.songs,
                   palette = EXCLUDED.palette,
                   submitted_at = now()"#,
        )
        .bind(group_id)
        .bind(submission.user_id)
        .bind(Json(&submission.images))
        .bind(Json(&submission.songs))
        .bind(&submission.palette)
        .execute(&mut *tx)
        .await?;

        let (submitted, members) = sqlx::query_as::<_, (i64, i64)>(
            r#"SELECT
                (SELECT COUNT(*) FROM group_preferences WHERE group_id = $1),
                (SELECT COUNT(*) FROM user_groups WHERE group_id = $1)"#,
        )
        .bind(group_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SubmissionResult::Recorded(SubmissionProgress { submitted, members }))
    }

    async fn list_preferences(&self, group_id: Uuid) -> Result<Vec<GroupPreference>> {
        let rows = sqlx::query_as::<_, PreferenceRow>(
            r#"SELECT user_id, images, songs, palette
               FROM group_preferences
               WHERE group_id = $1
               ORDER BY submitted_at"#,
        )
        .bind(group_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(rows.into_iter().map(GroupPreference::from).collect())
    }

    async fn store_recommendation(&self, group_id: Uuid, recommendation: &Recommendation) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE groups
               SET recommendations = $2, state = $3
               WHERE id = $1 AND state = $4"#,
        )
        .bind(group_id)
        .bind(Json(recommendation))
        .bind(GroupState::Activities.as_str())
        .bind(GroupState::Preferences.as_str())
        .execute(self.pool.get_pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn replace_activities(&self, group_id: Uuid, activities: &[Activity]) -> Result<()> {
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query("DELETE FROM group_activities WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        for (position, activity) in activities.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO group_activities (group_id, position, title, description, start_at, category)
                   VALUES ($1, $2, $3, $4, $5, $6)"#,
            )
            .bind(group_id)
            .bind(position as i32)
            .bind(&activity.title)
            .bind(&activity.description)
            .bind(&activity.start)
            .bind(&activity.category)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE groups SET state = $2 WHERE id = $1")
            .bind(group_id)
            .bind(GroupState::Final.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_activities(&self, group_id: Uuid) -> Result<Vec<Activity>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"SELECT title, description, start_at, category
               FROM group_activities
               WHERE group_id = $1
               ORDER BY position"#,
        )
        .bind(group_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(rows.into_iter().map(Activity::from).collect())
    }
}
