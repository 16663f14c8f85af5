pub mod json_store;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of HTML-bearing course content, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Page,
    Assignment,
    Discussion,
    Announcement,
    Syllabus,
    Quiz,
    NewQuiz,
}

impl ContentKind {
    pub const ALL: [ContentKind; 7] = [
        ContentKind::Page,
        ContentKind::Assignment,
        ContentKind::Discussion,
        ContentKind::Announcement,
        ContentKind::Syllabus,
        ContentKind::Quiz,
        ContentKind::NewQuiz,
    ];

    /// Plural label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Page => "Pages",
            ContentKind::Assignment => "Assignments",
            ContentKind::Discussion => "Discussions",
            ContentKind::Announcement => "Announcements",
            ContentKind::Syllabus => "Syllabus",
            ContentKind::Quiz => "Quizzes",
            ContentKind::NewQuiz => "New Quizzes",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One piece of course content with an HTML body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub kind: ContentKind,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("failed to list {kind}: {reason}")]
    List { kind: ContentKind, reason: String },
    #[error("no {kind} item with id {id:?}")]
    MissingItem { kind: ContentKind, id: String },
    #[error("failed to update {kind} item {id:?}: {reason}")]
    Update {
        kind: ContentKind,
        id: String,
        reason: String,
    },
}

/// Supplies content items of one kind at a time.
pub trait ContentSource {
    fn items(&self, kind: ContentKind) -> Result<Vec<ContentItem>, CollectorError>;
}

/// Accepts edited HTML for an item previously returned by a [`ContentSource`].
pub trait ContentSink {
    fn update(&mut self, item: &ContentItem, body: &str) -> Result<(), CollectorError>;
}
