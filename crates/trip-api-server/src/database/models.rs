use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::group::{GroupPreference, GroupRecord, Member, SongPick};
use crate::models::travel::{Activity, Recommendation};

#[derive(Debug, Clone, FromRow)]
pub struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub state: String,
    pub recommendations: Option<Json<Recommendation>>,
    pub trip_start_date: Option<DateTime<Utc>>,
    pub trip_end_date: Option<DateTime<Utc>>,
}

impl GroupRow {
    pub fn into_record(self) -> Result<GroupRecord> {
        Ok(GroupRecord {
            id: self.id,
            name: self.name,
            code: self.code,
            state: self.state.parse()?,
            recommendations: self.recommendations.map(|Json(r)| r),
            start_date: self.trip_start_date,
            end_date: self.trip_end_date,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub group_id: Uuid,
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        Member {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PreferenceRow {
    pub user_id: Uuid,
    pub images: Json<Vec<String>>,
    pub songs: Json<Vec<SongPick>>,
    pub palette: Option<String>,
}

impl From<PreferenceRow> for GroupPreference {
    fn from(row: PreferenceRow) -> Self {
        GroupPreference {
            user_id: row.user_id,
            images: row.images.0,
            songs: row.songs.0,
            palette: row.palette,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ActivityRow {
    pub title: String,
    pub description: String,
    pub start_at: String,
    pub category: String,
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Activity {
            title: row.title,
            description: row.description,
            start: row.start_at,
            category: row.category,
        }
    }
}
