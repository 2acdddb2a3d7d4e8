pub mod config;
pub mod db;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod startup;
pub mod storage;
pub mod telemetry;
