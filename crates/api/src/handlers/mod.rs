pub mod deck;
pub mod slides;
pub mod uploads;
