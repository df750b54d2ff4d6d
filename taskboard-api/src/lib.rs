//! # Taskboard API Server Library
//!
//! HTTP surface of Taskboard: a personal task board backed by the
//! repositories in `taskboard-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and session authentication
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
