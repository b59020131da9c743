//! Proxy auto-discovery: decides which HTTP proxy, if any, reaches a URL.
//!
//! A simple system proxy is used when one is configured. Otherwise the PAC
//! script published by the OS is fetched, evaluated in an embedded JavaScript
//! engine, and its first directive becomes the answer.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{NoProxyReason, ProxyEndpoint, ProxyOrigin, ProxyResolver, Resolution, ResolveError};
