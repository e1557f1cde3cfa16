pub mod auction;
pub mod bidding;
pub mod config;
pub mod database;
pub mod handlers;
pub mod marketplace;
pub mod query;
pub mod scheduler;
pub mod store;
