use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::GroupStore;
use crate::models::flight::{FlightQuery, RoundTripQuote};
use crate::models::group::{
    GroupPreference, GroupRecord, GroupState, GroupSummary, JoinGroupRequest, PreferenceOutcome,
    PreferenceSubmission, SubmissionResult,
};
use crate::models::travel::{Activity, ActivityRequest, RecommendationRequest};
use crate::services::events::EventsService;
use crate::services::flights::FlightService;
use crate::services::openai::TravelAdvisor;
use crate::utils::ApiError;

/// Images one member may put on the mood board
pub const MAX_IMAGES_PER_MEMBER: usize = 6;
/// Images sent to the model for the whole group
pub const MAX_AGGREGATE_IMAGES: usize = 10;

/// Merge every member's mood board into one recommendation request
pub fn aggregate_preferences(preferences: &[GroupPreference]) -> RecommendationRequest {
    let images = preferences
        .iter()
        .flat_map(|p| p.images.iter().cloned())
        .take(MAX_AGGREGATE_IMAGES)
        .collect();

    let mut palettes: Vec<&str> = Vec::new();
    for palette in preferences.iter().filter_map(|p| p.palette.as_deref()) {
        let palette = palette.trim();
        if !palette.is_empty() && !palettes.contains(&palette) {
            palettes.push(palette);
        }
    }

    let songs: Vec<String> = preferences
        .iter()
        .flat_map(|p| p.songs.iter().map(ToString::to_string))
        .collect();

    RecommendationRequest {
        images,
        palette: palettes.join(", "),
        album_mood: songs.join("; "),
    }
}

pub struct GroupService {
    store: Arc<dyn GroupStore>,
    advisor: Arc<dyn TravelAdvisor>,
    events: Arc<EventsService>,
    flights: Arc<FlightService>,
}

impl GroupService {
    pub fn new(
        store: Arc<dyn GroupStore>,
        advisor: Arc<dyn TravelAdvisor>,
        events: Arc<EventsService>,
        flights: Arc<FlightService>,
    ) -> Self {
        Self { store, advisor, events, flights }
    }

    async fn require_group(&self, group_id: Uuid) -> Result<GroupRecord, ApiError> {
        self.store
            .get_group(group_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Group {} not found", group_id)))
    }

    fn recommended_airport(group: &GroupRecord) -> Result<String, ApiError> {
        group
            .recommendations
            .as_ref()
            .ok_or_else(|| ApiError::BadRequest("Group has no recommendation yet".to_string()))?
            .place_code
            .clone()
            .ok_or_else(|| ApiError::BadRequest("Recommendation has no airport code".to_string()))
    }

    pub async fn ping(&self) -> Result<(), ApiError> {
        Ok(self.store.ping().await?)
    }

    /// Adds the user to the group carrying `code`
    pub async fn join_group(&self, request: JoinGroupRequest) -> Result<GroupRecord, ApiError> {
        let code = request.code.trim();
        if code.is_empty() {
            return Err(ApiError::BadRequest("Group code is required".to_string()));
        }

        let group = self
            .store
            .join_by_code(code, request.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No group with code {}", code)))?;

        info!("User {} joined group {}", request.user_id, group.id);
        Ok(group)
    }

    pub async fn list_user_groups(&self, user_id: Uuid) -> Result<Vec<GroupSummary>, ApiError> {
        Ok(self.store.list_user_groups(user_id).await?)
    }

    /// Records a member's preferences; the submission that completes the
    /// group triggers the recommendation.
    pub async fn submit_preferences(
        &self,
        group_id: Uuid,
        submission: PreferenceSubmission,
    ) -> Result<PreferenceOutcome, ApiError> {
        if submission.images.len() > MAX_IMAGES_PER_MEMBER {
            return Err(ApiError::BadRequest(format!(
                "At most {} images per member",
                MAX_IMAGES_PER_MEMBER
            )));
        }

        let progress = match self.store.submit_preferences(group_id, &submission).await? {
            SubmissionResult::Recorded(progress) => progress,
            SubmissionResult::GroupMissing => {
                return Err(ApiError::NotFound(format!("Group {} not found", group_id)));
            }
            SubmissionResult::Closed(state) => {
                return Err(ApiError::BadRequest(format!(
                    "Group is in '{}' state, preferences are closed",
                    state
                )));
            }
            SubmissionResult::NotMember => {
                return Err(ApiError::Forbidden(format!(
                    "User {} is not a member of group {}",
                    submission.user_id, group_id
                )));
            }
        };
        info!(
            "Group {}: {}/{} members submitted preferences",
            group_id, progress.submitted, progress.members
        );

        if !progress.is_complete() {
            return Ok(PreferenceOutcome { progress, complete: false, recommendation: None });
        }

        let preferences = self.store.list_preferences(group_id).await?;
        let request = aggregate_preferences(&preferences);
        let recommendation = self.advisor.recommend(&request).await?;

        if !self.store.store_recommendation(group_id, &recommendation).await? {
            warn!("Group {} already has a recommendation, keeping the stored one", group_id);
            let stored = self.require_group(group_id).await?.recommendations;
            return Ok(PreferenceOutcome {
                progress,
                complete: true,
                recommendation: stored.or(Some(recommendation)),
            });
        }

        info!("Group {} recommended {}", group_id, recommendation.destination);
        Ok(PreferenceOutcome { progress, complete: true, recommendation: Some(recommendation) })
    }

    pub async fn suggest_activities(&self, group_id: Uuid) -> Result<Vec<Activity>, ApiError> {
        let group = self.require_group(group_id).await?;
        let place_code = Self::recommended_airport(&group)?;
        let (start, end) = match (group.start_date, group.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(ApiError::BadRequest("Group has no trip dates".to_string())),
        };

        let request = ActivityRequest {
            place_code,
            start_date: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            end_date: end.format("%Y-%m-%dT%H:%M:%S").to_string(),
        };
        Ok(self.events.activities(&request).await)
    }

    pub async fn list_activities(&self, group_id: Uuid) -> Result<Vec<Activity>, ApiError> {
        self.require_group(group_id).await?;
        Ok(self.store.list_activities(group_id).await?)
    }

    pub async fn save_activities(&self, group_id: Uuid, activities: Vec<Activity>) -> Result<Vec<Activity>, ApiError> {
        let group = self.require_group(group_id).await?;
        if group.state == GroupState::Preferences {
            return Err(ApiError::BadRequest("Group has not received a recommendation yet".to_string()));
        }
        if activities.is_empty() {
            return Err(ApiError::BadRequest("Select at least one activity".to_string()));
        }

        self.store.replace_activities(group_id, &activities).await?;
        info!("Group {} finalized with {} activities", group_id, activities.len());
        Ok(activities)
    }

    /// Round trip from `origin` to the recommended destination over the trip dates
    pub async fn trip_cost(&self, group_id: Uuid, origin: &str) -> Result<RoundTripQuote, ApiError> {
        let group = self.require_group(group_id).await?;
        let place_code = Self::recommended_airport(&group)?;
        let (start, end) = match (group.start_date, group.end_date) {
            (Some(start), Some(end)) => (start.date_naive(), end.date_naive()),
            _ => return Err(ApiError::BadRequest("Group has no trip dates".to_string())),
        };

        let outbound = FlightQuery::new(origin, &place_code, start)?;
        self.flights.round_trip(&outbound, end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitsConfig, PredictHqConfig};
    use crate::database::store::MockGroupStore;
    use crate::models::group::{SongPick, SubmissionProgress};
    use crate::models::travel::Recommendation;
    use crate::services::flights::{MockFlightSearchApi, PollPolicy};
    use crate::services::openai::MockTravelAdvisor;
    use crate::utils::Limiters;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn group(state: GroupState, recommendation: Option<Recommendation>) -> GroupRecord {
        GroupRecord {
            id: Uuid::nil(),
            name: "Summer crew".into(),
            code: "AB12CD".into(),
            state,
            recommendations: recommendation,
            start_date: Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2025, 7, 8, 0, 0, 0).unwrap()),
        }
    }

    fn recommendation() -> Recommendation {
        Recommendation {
            destination: "Lisboa, Portugal".into(),
            place_code: Some("LIS".into()),
            activities: vec!["Tram 28".into()],
            explanation: "Warm palette, fado mood".into(),
        }
    }

    fn preference(images: &[&str], palette: Option<&str>, song: Option<(&str, &str)>) -> GroupPreference {
        GroupPreference {
            user_id: Uuid::new_v4(),
            images: images.iter().map(|s| s.to_string()).collect(),
            songs: song
                .map(|(name, artist)| vec![SongPick { name: name.into(), artist: Some(artist.into()) }])
                .unwrap_or_default(),
            palette: palette.map(String::from),
        }
    }

    fn submission(user_id: Uuid) -> PreferenceSubmission {
        PreferenceSubmission {
            user_id,
            images: vec!["https://img/1.jpg".into()],
            songs: vec![],
            palette: Some("Sunset".into()),
        }
    }

    fn service(store: MockGroupStore, advisor: MockTravelAdvisor, flights: MockFlightSearchApi) -> GroupService {
        let advisor: Arc<dyn TravelAdvisor> = Arc::new(advisor);
        let limiters = Arc::new(Limiters::new(&LimitsConfig::default()));
        let events = Arc::new(EventsService::new(
            reqwest::Client::new(),
            PredictHqConfig {
                base_url: "http://127.0.0.1:9".into(),
                api_key: String::new(),
                categories: String::new(),
                min_results: 6,
                max_results: 10,
            },
            advisor.clone(),
        ));
        let flights = Arc::new(FlightService::new(
            Arc::new(flights),
            PollPolicy { max_attempts: 2, interval: Duration::from_millis(1) },
            limiters,
        ));
        GroupService::new(Arc::new(store), advisor, events, flights)
    }

    #[test]
    fn test_aggregate_merges_members() {
        let prefs = vec![
            preference(&["a", "b"], Some("Sunset"), Some(("Lisboa", "ANAVITÓRIA"))),
            preference(&["c"], Some("Sunset"), None),
            preference(&[], Some(" Ocean "), Some(("Aguas de Março", "Elis Regina"))),
        ];

        let request = aggregate_preferences(&prefs);
        assert_eq!(request.images, vec!["a", "b", "c"]);
        assert_eq!(request.palette, "Sunset, Ocean");
        assert_eq!(request.album_mood, "Lisboa by ANAVITÓRIA; Aguas de Março by Elis Regina");
    }

    #[test]
    fn test_aggregate_caps_images() {
        let many: Vec<String> = (0..6).map(|i| format!("img-{}", i)).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let prefs = vec![preference(&refs, None, None), preference(&refs, None, None)];

        assert_eq!(aggregate_preferences(&prefs).images.len(), MAX_AGGREGATE_IMAGES);
    }

    #[tokio::test]
    async fn test_partial_submission_does_not_recommend() {
        let user = Uuid::new_v4();
        let mut store = MockGroupStore::new();
        store
            .expect_submit_preferences()
            .times(1)
            .returning(|_, _| Ok(SubmissionResult::Recorded(SubmissionProgress { submitted: 1, members: 3 })));
        store.expect_store_recommendation().never();

        let mut advisor = MockTravelAdvisor::new();
        advisor.expect_recommend().never();

        let outcome = service(store, advisor, MockFlightSearchApi::new())
            .submit_preferences(Uuid::nil(), submission(user))
            .await
            .unwrap();

        assert!(!outcome.complete);
        assert_eq!(outcome.progress.submitted, 1);
        assert!(outcome.recommendation.is_none());
    }

    #[tokio::test]
    async fn test_last_submission_triggers_recommendation() {
        let mut store = MockGroupStore::new();
        store
            .expect_submit_preferences()
            .returning(|_, _| Ok(SubmissionResult::Recorded(SubmissionProgress { submitted: 2, members: 2 })));
        store.expect_list_preferences().returning(|_| {
            Ok(vec![
                preference(&["x"], Some("Sunset"), None),
                preference(&["y"], Some("Desert"), None),
            ])
        });
        store
            .expect_store_recommendation()
            .withf(|_, rec| rec.place_code.as_deref() == Some("LIS"))
            .times(1)
            .returning(|_, _| Ok(true));

        let mut advisor = MockTravelAdvisor::new();
        advisor
            .expect_recommend()
            .withf(|req| req.images == vec!["x".to_string(), "y".to_string()] && req.palette == "Sunset, Desert")
            .times(1)
            .returning(|_| Ok(recommendation()));

        let outcome = service(store, advisor, MockFlightSearchApi::new())
            .submit_preferences(Uuid::nil(), submission(Uuid::new_v4()))
            .await
            .unwrap();

        assert!(outcome.complete);
        assert_eq!(outcome.recommendation.unwrap().destination, "Lisboa, Portugal");
    }

    #[tokio::test]
    async fn test_non_member_is_forbidden() {
        let mut store = MockGroupStore::new();
        store.expect_submit_preferences().returning(|_, _| Ok(SubmissionResult::NotMember));
        store.expect_list_preferences().never();

        let result = service(store, MockTravelAdvisor::new(), MockFlightSearchApi::new())
            .submit_preferences(Uuid::nil(), submission(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_closed_group_rejects_preferences() {
        // The group left `preferences` between the caller's read and the locked write
        let mut store = MockGroupStore::new();
        store
            .expect_submit_preferences()
            .returning(|_, _| Ok(SubmissionResult::Closed(GroupState::Activities)));
        store.expect_list_preferences().never();
        store.expect_store_recommendation().never();

        let mut advisor = MockTravelAdvisor::new();
        advisor.expect_recommend().never();

        let result = service(store, advisor, MockFlightSearchApi::new())
            .submit_preferences(Uuid::nil(), submission(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_submission_to_missing_group_is_not_found() {
        let mut store = MockGroupStore::new();
        store.expect_submit_preferences().returning(|_, _| Ok(SubmissionResult::GroupMissing));

        let result = service(store, MockTravelAdvisor::new(), MockFlightSearchApi::new())
            .submit_preferences(Uuid::new_v4(), submission(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_join_trims_code_and_returns_group() {
        let user = Uuid::new_v4();
        let mut store = MockGroupStore::new();
        store
            .expect_join_by_code()
            .withf(move |code, user_id| code.to_string() == "AB12CD" && *user_id == user)
            .times(1)
            .returning(|_, _| Ok(Some(group(GroupState::Preferences, None))));

        let joined = service(store, MockTravelAdvisor::new(), MockFlightSearchApi::new())
            .join_group(JoinGroupRequest { user_id: user, code: " AB12CD ".into() })
            .await
            .unwrap();
        assert_eq!(joined.code, "AB12CD");
    }

    #[tokio::test]
    async fn test_join_unknown_code_is_not_found() {
        let mut store = MockGroupStore::new();
        store.expect_join_by_code().returning(|_, _| Ok(None));

        let result = service(store, MockTravelAdvisor::new(), MockFlightSearchApi::new())
            .join_group(JoinGroupRequest { user_id: Uuid::new_v4(), code: "NOPE".into() })
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_join_blank_code_skips_store() {
        let mut store = MockGroupStore::new();
        store.expect_join_by_code().never();

        let result = service(store, MockTravelAdvisor::new(), MockFlightSearchApi::new())
            .join_group(JoinGroupRequest { user_id: Uuid::new_v4(), code: "  ".into() })
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_too_many_images_rejected_before_store() {
        let store = MockGroupStore::new();
        let mut sub = submission(Uuid::new_v4());
        sub.images = (0..7).map(|i| i.to_string()).collect();

        let result = service(store, MockTravelAdvisor::new(), MockFlightSearchApi::new())
            .submit_preferences(Uuid::nil(), sub)
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_save_activities_requires_recommendation() {
        let mut store = MockGroupStore::new();
        store.expect_get_group().returning(|_| Ok(Some(group(GroupState::Preferences, None))));
        store.expect_replace_activities().never();

        let result = service(store, MockTravelAdvisor::new(), MockFlightSearchApi::new())
            .save_activities(
                Uuid::nil(),
                vec![Activity {
                    title: "Tram 28".into(),
                    description: String::new(),
                    start: String::new(),
                    category: "community".into(),
                }],
            )
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_group_is_not_found() {
        let mut store = MockGroupStore::new();
        store.expect_get_group().returning(|_| Ok(None));

        let result = service(store, MockTravelAdvisor::new(), MockFlightSearchApi::new())
            .list_activities(Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_trip_cost_uses_recommended_airport_and_dates() {
        let mut store = MockGroupStore::new();
        store
            .expect_get_group()
            .returning(|_| Ok(Some(group(GroupState::Activities, Some(recommendation())))));

        let mut flights = MockFlightSearchApi::new();
        flights
            .expect_create_session()
            .withf(|q| q.origin == "BCN" && q.destination == "LIS" && q.date.to_string() == "2025-07-01")
            .times(1)
            .returning(|_| Ok("out".to_string()));
        flights
            .expect_create_session()
            .withf(|q| q.origin == "LIS" && q.destination == "BCN" && q.date.to_string() == "2025-07-08")
            .times(1)
            .returning(|_| Ok("back".to_string()));
        flights.expect_poll_session().returning(|_| {
            Ok(serde_json::from_value(serde_json::json!({
                "content": { "results": {
                    "agents": { "a": {} },
                    "itineraries": { "i": { "pricingOptions": [
                        { "price": { "amount": "80000", "unit": "PRICE_UNIT_MILLI" } }
                    ]}}
                }}
            }))
            .unwrap())
        });
        flights.expect_currency().return_const("EUR".to_string());

        let quote = service(store, MockTravelAdvisor::new(), flights)
            .trip_cost(Uuid::nil(), "bcn")
            .await
            .unwrap();

        assert_eq!(quote.total, 160.0);
        assert_eq!(quote.currency, "EUR");
    }
}
