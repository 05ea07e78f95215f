//! Comment records: the input boundary of the detector.
//! Records are immutable once ingested; [`CommentCorpus`] indexes them by author and id.

mod corpus;
mod load;

pub use corpus::CommentCorpus;
pub use load::{load_comments, parse_comments};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commenting identity (channel id).
pub type AuthorId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, alias = "comment_id")]
    pub id: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub author_id: AuthorId,
    /// Display name, used for username-pattern signals
    #[serde(default, alias = "author")]
    pub author_name: String,
    #[serde(default)]
    pub text: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub is_reply: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub video: VideoContext,
    #[serde(flatten)]
    pub channel: AuthorChannel,
}

/// Optional enrichment about the video the comment was posted on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    /// Channel that owns the video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
}

/// Optional enrichment about the commenting account's own channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorChannel {
    #[serde(
        default,
        alias = "author_channel_created",
        skip_serializing_if = "Option::is_none"
    )]
    pub author_channel_created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_subscriber_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_video_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_total_views: Option<u64>,
}

impl Comment {
    pub fn new(
        id: impl Into<String>,
        video_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        let author_id = author_id.into();
        Self {
            id: id.into(),
            video_id: video_id.into(),
            author_name: author_id.clone(),
            author_id,
            text: text.into(),
            published_at,
            like_count: 0,
            is_reply: false,
            parent_id: None,
            video: VideoContext::default(),
            channel: AuthorChannel::default(),
        }
    }

    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = name.into();
        self
    }

    pub fn with_likes(mut self, likes: u64) -> Self {
        self.like_count = likes;
        self
    }

    pub fn reply_to(mut self, parent_id: impl Into<String>) -> Self {
        self.is_reply = true;
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_video(mut self, title: impl Into<String>, channel_title: impl Into<String>) -> Self {
        self.video = VideoContext {
            video_title: Some(title.into()),
            channel_title: Some(channel_title.into()),
        };
        self
    }

    pub fn with_channel(mut self, channel: AuthorChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Name used for username signals; falls back to the author id.
    pub fn username(&self) -> &str {
        if self.author_name.trim().is_empty() {
            &self.author_id
        } else {
            &self.author_name
        }
    }

    /// Record carries every identifier the detector keys on.
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty()
            && !self.author_id.trim().is_empty()
            && !self.video_id.trim().is_empty()
    }
}
