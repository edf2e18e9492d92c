//! Domains module containing business logic organized by bounded contexts.
//!
//! The server exposes a single domain, tools, backed by Grafana Tempo.

pub mod tools;
