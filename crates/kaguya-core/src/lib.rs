pub mod catalog;
pub mod config;
pub mod episodes;
pub mod error;
pub mod models;
pub mod ordinal;
pub mod storage;
