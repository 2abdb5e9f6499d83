pub mod clock;
pub mod config;
pub mod conversation;
pub mod db;
pub mod error;
pub mod handlers;
pub mod menu;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
