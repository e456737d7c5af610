use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Number of characters of a post's text used for its display form.
pub const POST_LABEL_LENGTH: usize = 15;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn url(&self) -> String {
        profile_url(&self.username)
    }

    pub fn gravatar_url(&self, size: u32) -> String {
        gravatar_url(&self.email, size)
    }
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", path_segment(username))
}

pub fn group_url(slug: &str) -> String {
    format!("/group/{}/", path_segment(slug))
}

/// Normalizes a group slug to lowercase ASCII words joined by `-`. `None`
/// when nothing usable is left.
pub fn group_slug(raw: &str) -> Option<String> {
    let slug = slug::slugify(raw);
    (!slug.is_empty()).then_some(slug)
}

/// Percent-encodes a value for use as a single path segment.
fn path_segment(value: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
    // A literal `+` was already escaped, so any left over stands for a space.
    encoded.replace('+', "%20")
}

pub fn post_url(id: i64) -> String {
    format!("/posts/{}/", id)
}

fn gravatar_url(email: &str, size: u32) -> String {
    let email_hash = format!("{:x}", md5::compute(email.trim().to_lowercase().as_bytes()));
    format!(
        "https://www.gravatar.com/avatar/{}?s={}&d=identicon",
        email_hash, size
    )
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    pub fn url(&self) -> String {
        group_url(&self.slug)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl Post {
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&truncate_chars(&self.text, POST_LABEL_LENGTH))
    }
}

/// A post joined with the author and group columns the listings render.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub author_id: Uuid,
    pub author_username: String,
    pub author_email: String,
    pub group_id: Option<i64>,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

impl PostCard {
    pub fn url(&self) -> String {
        post_url(self.id)
    }

    pub fn edit_url(&self) -> String {
        format!("/posts/{}/edit/", self.id)
    }

    pub fn author_url(&self) -> String {
        profile_url(&self.author_username)
    }

    pub fn group(&self) -> Option<GroupLink> {
        match (&self.group_title, &self.group_slug) {
            (Some(title), Some(slug)) => Some(GroupLink {
                title: title.clone(),
                url: group_url(slug),
            }),
            _ => None,
        }
    }

    pub fn author_gravatar(&self, size: u32) -> String {
        gravatar_url(&self.author_email, size)
    }

    pub fn published(&self) -> String {
        self.pub_date.format("%d %b %Y, %H:%M").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupLink {
    pub title: String,
    pub url: String,
}

impl fmt::Display for PostCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&truncate_chars(&self.text, POST_LABEL_LENGTH))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

fn truncate_chars(text: &str, length: usize) -> String {
    text.chars().take(length).collect()
}
