pub mod config;
pub mod favorites;
pub mod models;
pub mod routes;
pub mod shell;
pub mod storage;
pub mod tmdb;
pub mod views;
