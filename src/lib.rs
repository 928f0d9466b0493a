// src/lib.rs

//! notion-relay library
//!
//! Polls a Notion task database, detects new and changed tasks against an
//! in-memory snapshot, and relays them to a Telegram chat.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
