use serde::{Deserialize, Serialize};

/// Data lifted off a rendered page, one variant per page kind.
///
/// Counts (likes, connections, followers) stay display strings because the
/// source renders them abbreviated and localized ("1.2K", "500+"). Turning
/// them into numbers is left to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExtractedRecord {
    Company(CompanyRecord),
    Profile(ProfileRecord),
    Post(PostRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub industry: String,
    pub website: String,
    pub company_size: String,
    pub headquarters: String,
    pub founded: String,
    pub specialties: Vec<String>,
    pub about: String,
    pub recent_posts: Vec<FeedPost>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    pub text: String,
    pub likes: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub headline: String,
    pub location: String,
    pub connections: String,
    pub about: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub years: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub author: String,
    pub author_headline: String,
    pub content: String,
    pub timestamp: String,
    pub likes: String,
    pub comments: String,
    pub reposts: String,
    pub comments_list: Vec<PostComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostComment {
    pub author: String,
    pub text: String,
}
