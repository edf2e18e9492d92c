//! Grafana Tempo tools.
//!
//! - `get_traces`: traces for a service within a time window
//! - `get_trace`: a single trace by ID
//! - `search_traces`: TraceQL search by service, tags or raw query
//! - `query_metrics`: TraceQL metrics over a time range
//!
//! All tools share one [`TempoClient`].

pub mod client;
pub mod common;
pub mod get_trace;
pub mod get_traces;
pub mod query_metrics;
pub mod search_traces;

pub use client::{BackendError, TempoClient};
pub use get_trace::{GetTraceParams, GetTraceTool};
pub use get_traces::{GetTracesParams, GetTracesTool, TraceQuery};
pub use query_metrics::{QueryMetricsParams, QueryMetricsTool};
pub use search_traces::{SearchQuery, SearchTracesParams, SearchTracesTool};
