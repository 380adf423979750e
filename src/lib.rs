pub mod app_service;
pub mod commands;
pub mod config;
pub mod storage;
pub mod summary;
