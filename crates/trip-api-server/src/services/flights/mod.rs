//! Flight price lookup over a session-based live search API.
//!
//! A search is created once, then polled at a fixed interval until partner
//! agents have priced it or the attempt budget runs out.

pub mod pricing;
pub mod skyscanner;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SkyscannerConfig;
use crate::models::flight::{FlightQuery, FlightQuote, RoundTripQuote};
use crate::utils::{ApiError, Limiters};
use pricing::SearchResponse;

pub use skyscanner::SkyscannerClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlightSearchApi: Send + Sync {
    /// Start a live search, returning its session token
    async fn create_session(&self, query: &FlightQuery) -> Result<String, ApiError>;

    async fn poll_session(&self, session_token: &str) -> Result<SearchResponse, ApiError>;

    fn currency(&self) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl From<&SkyscannerConfig> for PollPolicy {
    fn from(config: &SkyscannerConfig) -> Self {
        Self {
            max_attempts: config.poll_max_attempts,
            interval: config.poll_interval(),
        }
    }
}

#[derive(Clone)]
pub struct FlightService {
    api: Arc<dyn FlightSearchApi>,
    policy: PollPolicy,
    limiters: Arc<Limiters>,
}

impl FlightService {
    pub fn new(api: Arc<dyn FlightSearchApi>, policy: PollPolicy, limiters: Arc<Limiters>) -> Self {
        Self { api, policy, limiters }
    }

    /// Cheapest price for one leg.
    ///
    /// Transport failures surface at once as `UpstreamError`; an exhausted
    /// poll budget or a priced search without any amount is `NotFound`.
    pub async fn cheapest_price(&self, query: &FlightQuery) -> Result<FlightQuote, ApiError> {
        let (_permit, waited) = Limiters::acquire_timed(
            self.limiters.flight_search.clone(),
            self.limiters.acquire_timeout,
            "flight_search",
        )
        .await?;

        if waited > Duration::from_secs(1) {
            debug!("Flight search waited {:?} for a slot", waited);
        }

        let session_token = self.api.create_session(query).await?;
        info!(
            "Flight search session created for {} -> {} on {}",
            query.origin, query.destination, query.date
        );

        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;

            let response = self.api.poll_session(&session_token).await?;
            if !response.has_agents() {
                debug!("Poll {}/{}: no agents yet", attempt, self.policy.max_attempts);
                continue;
            }

            let (itinerary_id, price) = response.cheapest().ok_or_else(|| {
                ApiError::NotFound(format!(
                    "No priced itineraries for {} -> {}",
                    query.origin, query.destination
                ))
            })?;

            info!("Cheapest {} -> {}: {} after {} polls", query.origin, query.destination, price, attempt);
            return Ok(FlightQuote {
                price,
                currency: self.api.currency(),
                itinerary_id,
            });
        }

        warn!(
            "No flight results for {} -> {} after {} polls",
            query.origin, query.destination, self.policy.max_attempts
        );
        Err(ApiError::NotFound(format!(
            "No flight results after {} attempts",
            self.policy.max_attempts
        )))
    }

    /// Both legs of a round trip, searched one after the other
    pub async fn round_trip(
        &self,
        outbound: &FlightQuery,
        return_date: chrono::NaiveDate,
    ) -> Result<RoundTripQuote, ApiError> {
        if return_date < outbound.date {
            return Err(ApiError::BadRequest("Return date is before departure".to_string()));
        }

        let outbound_quote = self.cheapest_price(outbound).await?;
        let inbound_quote = self.cheapest_price(&outbound.reversed(return_date)).await?;

        Ok(RoundTripQuote {
            total: outbound_quote.price + inbound_quote.price,
            currency: outbound_quote.currency.clone(),
            outbound: outbound_quote,
            inbound: inbound_quote,
        })
    }
}
