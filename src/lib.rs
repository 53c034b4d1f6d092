// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Socialcast: publish text posts to LinkedIn and Twitter
//!
//! This crate provides the backend API for connecting platform accounts,
//! storing their credentials encrypted at rest, and publishing posts with
//! per-user credentials.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{ConnectionCache, CredentialStore, LinkedInClient, PublishService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub credential_store: CredentialStore,
    pub linkedin: LinkedInClient,
    pub publisher: PublishService,
    /// Recent OAuth connections; debug visibility only, not authoritative
    pub connection_cache: ConnectionCache,
}
