// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod connections;
pub mod credentials;
pub mod crypto;
pub mod linkedin;
pub mod publisher;
pub mod twitter;

pub use connections::ConnectionCache;
pub use credentials::CredentialStore;
pub use crypto::CredentialCipher;
pub use linkedin::LinkedInClient;
pub use publisher::PublishService;
pub use twitter::TwitterClient;
