pub mod config;
pub mod logging;

pub mod episode;
pub mod job;
pub mod layout;
pub mod outcome;
pub mod resolver;
pub mod scheduler;
pub mod storage;
pub mod transfer;
