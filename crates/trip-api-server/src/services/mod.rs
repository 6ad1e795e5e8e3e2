pub mod events;
pub mod flights;
pub mod group_service;
pub mod itunes;
pub mod openai;
pub mod pexels;
pub mod spotify;

pub use events::EventsService;
pub use flights::{FlightSearchApi, FlightService, PollPolicy, SkyscannerClient};
pub use group_service::GroupService;
pub use itunes::ItunesService;
pub use openai::{OpenAiService, TravelAdvisor};
pub use pexels::PexelsService;
pub use spotify::SpotifyService;
