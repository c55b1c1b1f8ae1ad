// offline-cache - Install-time precache and cache-first offline proxy
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod network;
pub mod server;
pub mod utils;
pub mod worker;
