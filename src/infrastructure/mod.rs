//! Infrastructure layer module
//!
//! This module contains the concrete integrations behind the domain ports:
//! - reqwest HTTP transport with retry and rate limiting
//! - Configuration management
//! - Logging infrastructure
//! - Project setup and adapter wiring

pub mod config;
pub mod http;
pub mod logging;
pub mod setup;
