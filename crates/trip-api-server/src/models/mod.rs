pub mod flight;
pub mod group;
pub mod media;
pub mod travel;
