use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::database::GroupStore;
use crate::services::{
    EventsService, FlightService, GroupService, ItunesService, OpenAiService, PexelsService,
    PollPolicy, SkyscannerClient, SpotifyService, TravelAdvisor,
};
use crate::utils::Limiters;

/// Timeout for the plain pass-through vendor calls
const VENDOR_TIMEOUT: Duration = Duration::from_secs(20);

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<FlightService>,
    pub itunes: Arc<ItunesService>,
    pub pexels: Arc<PexelsService>,
    pub spotify: Arc<SpotifyService>,
    pub advisor: Arc<dyn TravelAdvisor>,
    pub events: Arc<EventsService>,
    pub groups: Arc<GroupService>,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn GroupStore>) -> Result<Self> {
        let limiters = Arc::new(Limiters::new(&settings.limits));
        let vendor_client = Client::builder().timeout(VENDOR_TIMEOUT).build()?;

        let skyscanner = SkyscannerClient::new(settings.skyscanner.clone())?;
        let flights = Arc::new(FlightService::new(
            Arc::new(skyscanner),
            PollPolicy::from(&settings.skyscanner),
            limiters.clone(),
        ));

        let advisor: Arc<dyn TravelAdvisor> =
            Arc::new(OpenAiService::new(settings.openai.clone(), limiters)?);

        let events = Arc::new(EventsService::new(
            vendor_client.clone(),
            settings.predicthq.clone(),
            advisor.clone(),
        ));

        let groups = Arc::new(GroupService::new(
            store,
            advisor.clone(),
            events.clone(),
            flights.clone(),
        ));

        Ok(Self {
            itunes: Arc::new(ItunesService::new(vendor_client.clone(), settings.itunes.clone())),
            pexels: Arc::new(PexelsService::new(vendor_client.clone(), settings.pexels.clone())),
            spotify: Arc::new(SpotifyService::new(vendor_client, settings.spotify)),
            flights,
            advisor,
            events,
            groups,
        })
    }
}
