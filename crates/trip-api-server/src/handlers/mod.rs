pub mod flights;
pub mod groups;
pub mod health;
pub mod media;
pub mod travel;
