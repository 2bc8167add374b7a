//! Driving adapters: entry points that invoke the domain.

pub mod http;
