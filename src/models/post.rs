// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post records: one document per publish attempt or draft.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target platforms, as a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    LinkedIn,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::LinkedIn => "linkedin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::LinkedIn),
            _ => Err(()),
        }
    }
}

/// Post lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Posted,
    Failed,
}

/// Per-platform publish outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformStatus {
    Success,
    Failed,
    Skipped,
}

/// Per-platform outcome slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformStatuses {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<PlatformStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<PlatformStatus>,
}

/// Remote response metadata recorded after a successful publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformPostData {
    /// Remote post identifier (tweet id / LinkedIn share URN)
    pub remote_id: String,
    /// When the publish call succeeded (RFC 3339)
    pub posted_at: String,
}

/// Per-platform response metadata slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<PlatformPostData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<PlatformPostData>,
}

/// A publish attempt/record stored in Firestore.
///
/// References the user by id with no cascade on user deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Random hex document ID
    pub id: String,
    pub content: String,
    pub platforms: Vec<Platform>,
    pub user_id: String,
    /// Accepted and stored but never acted on (no scheduler)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<String>,
    pub status: PostStatus,
    #[serde(default)]
    pub platform_status: PlatformStatuses,
    #[serde(default)]
    pub platform_data: PlatformData,
    /// Last failure message, when a publish attempt failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Post {
    /// Record an outcome on the given platform's slots.
    pub fn record_outcome(
        &mut self,
        platform: Platform,
        status: PlatformStatus,
        data: Option<PlatformPostData>,
        now: &str,
    ) {
        match platform {
            Platform::Twitter => {
                self.platform_status.twitter = Some(status);
                if data.is_some() {
                    self.platform_data.twitter = data;
                }
            }
            Platform::LinkedIn => {
                self.platform_status.linkedin = Some(status);
                if data.is_some() {
                    self.platform_data.linkedin = data;
                }
            }
        }
        self.status = match status {
            PlatformStatus::Success => PostStatus::Posted,
            PlatformStatus::Failed => PostStatus::Failed,
            PlatformStatus::Skipped => self.status,
        };
        self.updated_at = now.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing_is_closed() {
        assert_eq!("twitter".parse::<Platform>(), Ok(Platform::Twitter));
        assert_eq!("linkedin".parse::<Platform>(), Ok(Platform::LinkedIn));
        assert!("facebook".parse::<Platform>().is_err());
        assert!("Twitter".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::LinkedIn).unwrap(),
            "\"linkedin\""
        );
        let p: Platform = serde_json::from_str("\"twitter\"").unwrap();
        assert_eq!(p, Platform::Twitter);
    }

    #[test]
    fn test_record_outcome_updates_lifecycle() {
        let mut post = Post {
            id: "p1".to_string(),
            content: "hello".to_string(),
            platforms: vec![Platform::Twitter],
            user_id: "u1".to_string(),
            scheduled_for: None,
            status: PostStatus::Pending,
            platform_status: PlatformStatuses::default(),
            platform_data: PlatformData::default(),
            error: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };

        post.record_outcome(
            Platform::Twitter,
            PlatformStatus::Success,
            Some(PlatformPostData {
                remote_id: "123".to_string(),
                posted_at: "2026-01-02T00:00:00Z".to_string(),
            }),
            "2026-01-02T00:00:00Z",
        );

        assert_eq!(post.status, PostStatus::Posted);
        assert_eq!(post.platform_status.twitter, Some(PlatformStatus::Success));
        assert_eq!(post.platform_data.twitter.as_ref().unwrap().remote_id, "123");
        // The linkedin slot is untouched
        assert!(post.platform_status.linkedin.is_none());
    }

    #[test]
    fn test_record_failure_sets_failed() {
        let mut post = Post {
            id: "p1".to_string(),
            content: "hello".to_string(),
            platforms: vec![Platform::LinkedIn],
            user_id: "u1".to_string(),
            scheduled_for: None,
            status: PostStatus::Pending,
            platform_status: PlatformStatuses::default(),
            platform_data: PlatformData::default(),
            error: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };

        post.record_outcome(
            Platform::LinkedIn,
            PlatformStatus::Failed,
            None,
            "2026-01-02T00:00:00Z",
        );

        assert_eq!(post.status, PostStatus::Failed);
        assert!(post.platform_data.linkedin.is_none());
    }
}
