//! Command handlers

pub mod annotation;
pub mod config;
pub mod links;
pub mod search;
pub mod status;
