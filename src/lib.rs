pub mod config;
pub mod db;
pub mod export;
pub mod generate;
pub mod output;
pub mod sources;
pub mod trends;
