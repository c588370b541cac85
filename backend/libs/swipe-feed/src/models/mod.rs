use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Style category attached to every post.
///
/// `Category::ALL` fixes the order in which the selector lays out
/// probability intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Street,
    Casual,
    Formal,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Street, Category::Casual, Category::Formal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Street => "street",
            Category::Casual => "casual",
            Category::Formal => "formal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "street" => Ok(Category::Street),
            "casual" => Ok(Category::Casual),
            "formal" => Ok(Category::Formal),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// A post as surfaced in the swipe feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub category: Category,
    pub image_url: String,
    pub likes: u32,
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    /// Fresh post with no likes or comments.
    pub fn new(author_id: Uuid, category: Category, image_url: impl Into<String>) -> Self {
        Self {
            post_id: Uuid::new_v4(),
            author_id,
            category,
            image_url: image_url.into(),
            likes: 0,
            comment_count: 0,
            created_at: Utc::now(),
        }
    }
}

/// A like/dislike decision on a shown post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    Like,
    Dislike,
}

impl Engagement {
    pub fn is_like(&self) -> bool {
        matches!(self, Engagement::Like)
    }
}

impl From<bool> for Engagement {
    fn from(liked: bool) -> Self {
        if liked {
            Engagement::Like
        } else {
            Engagement::Dislike
        }
    }
}

/// Category restriction chosen by the viewer on the swipe page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "category")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

/// Identity of the viewer for one browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            started_at: Utc::now(),
        }
    }
}
