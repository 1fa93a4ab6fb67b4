pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod rating;
pub mod routes;
pub mod timestamp;
pub mod toilet;
