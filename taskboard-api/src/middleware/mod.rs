/// Middleware modules for the API server
///
/// Session authentication lives in [`crate::app`]; this module holds the
/// reusable tower layers.

pub mod security;
