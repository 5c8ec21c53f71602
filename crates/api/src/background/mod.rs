//! Long-running tasks spawned next to the HTTP server. Each stops when its
//! [`CancellationToken`](tokio_util::sync::CancellationToken) fires.

pub mod auth_code_cleanup;
