pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
