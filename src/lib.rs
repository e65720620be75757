//! blogicum - a small blogging backend
//!
//! This library provides posts, categories, comments and profiles with a
//! single visibility and ownership policy applied by every workflow.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod policy;
pub mod services;
