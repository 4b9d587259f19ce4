//! Catalog models
//!
//! JSON field names follow the legacy document shape (`_id`, `albumid`, ...)
//! so existing clients can read tracks pushed over the event channel.

use serde::{Deserialize, Serialize};

/// A playable track
///
/// `filename` is relative to the media root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Track {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub filename: String,
    /// 1-based position within the source album
    pub number: i64,
    #[serde(rename = "albumid")]
    pub album_id: String,
    #[serde(rename = "artistid")]
    pub artist_id: String,
    #[serde(rename = "length")]
    pub length_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Album {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "artistid")]
    pub artist_id: String,
    pub title: String,
    pub date: Option<String>,
    pub track_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Artist {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}
