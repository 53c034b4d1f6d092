// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-scoped record of recent OAuth connections.
//!
//! Debug visibility only: lives for the process lifetime, is NOT
//! authoritative, and holds no secret material. The credential store and
//! the user document are the source of truth for tokens.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;

/// Shared connection cache type for use in AppState.
pub type ConnectionCache = Arc<DashMap<String, ConnectionInfo>>;

/// One recent OAuth connection, keyed by user ID.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "hasToken")]
    pub has_token: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Record a connection after a successful OAuth callback.
pub fn record_connection(cache: &ConnectionCache, info: ConnectionInfo) {
    cache.insert(info.user_id.clone(), info);
}

/// Snapshot of all recorded connections.
pub fn list_connections(cache: &ConnectionCache) -> Vec<ConnectionInfo> {
    cache.iter().map(|entry| entry.value().clone()).collect()
}
