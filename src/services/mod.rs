pub mod aggregator;
pub mod calendar;
