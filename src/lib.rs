// src/lib.rs
pub mod api;
pub mod banner;
pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod models;
pub mod notify;
pub mod state;
pub mod tasks;
pub mod taxonomy;
pub mod validation;
pub mod view;
