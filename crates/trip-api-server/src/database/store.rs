//! Group persistence port

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::group::{
    GroupPreference, GroupRecord, GroupSummary, PreferenceSubmission, SubmissionResult,
};
use crate::models::travel::{Activity, Recommendation};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Cheap round trip used by the readiness check
    async fn ping(&self) -> Result<()>;

    async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<GroupSummary>>;

    async fn get_group(&self, group_id: Uuid) -> Result<Option<GroupRecord>>;

    /// Adds the user to the group with this join code. `None` when no group has it;
    /// joining twice is a no-op.
    async fn join_by_code(&self, code: &str, user_id: Uuid) -> Result<Option<GroupRecord>>;

    /// Locks the group row, checks it is still collecting preferences and that
    /// the user is a member, then upserts the preference row and counts members
    /// and submissions before releasing the lock.
    async fn submit_preferences(
        &self,
        group_id: Uuid,
        submission: &PreferenceSubmission,
    ) -> Result<SubmissionResult>;

    async fn list_preferences(&self, group_id: Uuid) -> Result<Vec<GroupPreference>>;

    /// Stores the recommendation and moves `preferences` to `activities`.
    /// Returns false when the group had already left `preferences`.
    async fn store_recommendation(&self, group_id: Uuid, recommendation: &Recommendation) -> Result<bool>;

    /// Replaces the selected activities and moves the group to `final`
    async fn replace_activities(&self, group_id: Uuid, activities: &[Activity]) -> Result<()>;

    async fn list_activities(&self, group_id: Uuid) -> Result<Vec<Activity>>;
}
