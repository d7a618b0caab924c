// Library exports for the FitTrack CLI
// This allows testing of internal modules

pub mod api;
pub mod auth;
pub mod builder;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod lifecycle;
pub mod models;
pub mod notifications;
pub mod storage;
pub mod ui;
pub mod validation;
pub mod video;
