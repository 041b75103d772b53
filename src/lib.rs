//! Canopy News - tree and forest news for a static site
//!
//! This crate ingests environmental RSS feeds into a JSON snapshot, renders
//! that snapshot with search and paging, and runs a small moderated message
//! board whose storage is a GitHub repository.

pub mod config;
pub mod error;
pub mod messages;
pub mod news;
pub mod routes;
pub mod view;
