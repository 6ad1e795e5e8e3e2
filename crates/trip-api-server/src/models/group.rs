use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::travel::{Activity, Recommendation};

/// Planning stage of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupState {
    /// Members are still submitting images, songs and palettes
    Preferences,
    /// A recommendation exists and activities are being chosen
    Activities,
    Final,
}

impl GroupState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupState::Preferences => "preferences",
            GroupState::Activities => "activities",
            GroupState::Final => "final",
        }
    }
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preferences" => Ok(GroupState::Preferences),
            "activities" => Ok(GroupState::Activities),
            "final" => Ok(GroupState::Final),
            other => Err(anyhow::anyhow!("Unknown group state: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub state: GroupState,
    pub recommendations: Option<Recommendation>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(flatten)]
    pub group: GroupRecord,
    pub users: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongPick {
    pub name: String,
    #[serde(default)]
    pub artist: Option<String>,
}

impl fmt::Display for SongPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.artist {
            Some(artist) => write!(f, "{} by {}", self.name, artist),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSubmission {
    pub user_id: Uuid,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub songs: Vec<SongPick>,
    #[serde(default)]
    pub palette: Option<String>,
}

/// A stored preference row, one per member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPreference {
    pub user_id: Uuid,
    pub images: Vec<String>,
    pub songs: Vec<SongPick>,
    pub palette: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionProgress {
    pub submitted: i64,
    pub members: i64,
}

impl SubmissionProgress {
    pub fn is_complete(&self) -> bool {
        self.members > 0 && self.submitted >= self.members
    }
}

/// What the store did with a submission, decided under the group row lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionResult {
    Recorded(SubmissionProgress),
    GroupMissing,
    /// The group already left `preferences`
    Closed(GroupState),
    NotMember,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceOutcome {
    #[serde(flatten)]
    pub progress: SubmissionProgress,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupRequest {
    pub user_id: Uuid,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivitySelection {
    pub activities: Vec<Activity>,
}

#[derive(Debug, Deserialize)]
pub struct TripCostParams {
    pub origin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trips_through_text() {
        for state in [GroupState::Preferences, GroupState::Activities, GroupState::Final] {
            assert_eq!(state.as_str().parse::<GroupState>().unwrap(), state);
        }
        assert!("archived".parse::<GroupState>().is_err());
    }

    #[test]
    fn test_progress_completion() {
        assert!(SubmissionProgress { submitted: 3, members: 3 }.is_complete());
        assert!(!SubmissionProgress { submitted: 2, members: 3 }.is_complete());
        assert!(!SubmissionProgress { submitted: 0, members: 0 }.is_complete());
    }

    #[test]
    fn test_song_display() {
        let song = SongPick { name: "Lisboa".into(), artist: Some("ANAVITÓRIA".into()) };
        assert_eq!(song.to_string(), "Lisboa by ANAVITÓRIA");
    }
}
