pub mod components;
pub mod config;
pub mod error;
pub mod handler;
pub mod startup;
