pub mod aggregator;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod coverage;
pub mod filter;
pub mod pipeline;
pub mod planner;
pub mod timezone;
