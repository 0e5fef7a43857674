pub mod journal_entry;
pub mod profile;
pub mod user;
