pub mod auth;
pub mod calendar;
pub mod health;
pub mod journal;
pub mod profile;
