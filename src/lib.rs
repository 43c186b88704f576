pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod images;
pub mod middleware;
pub mod primes;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod users;
