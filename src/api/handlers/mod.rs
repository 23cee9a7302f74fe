//! HTTP request handlers

pub mod errors;
pub mod health;
pub mod catalog;
pub mod composite;
pub mod sessions;
