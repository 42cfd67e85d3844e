//! Users, posts and follow edges.

use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::{DateTime, SubsecRound, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

use crate::{
    errors::{ValidationError, ValidationIssue, ValidationResult},
    records::Record,
    validators::is_present,
};

pub const USERS: &str = "users";
pub const POSTS: &str = "posts";
pub const FOLLOWS: &str = "follows";

/// Stored field names used in queries.
pub mod fields {
    pub const SEARCH_KEYWORDS: &str = "searchKeywords";
    pub const CREATOR_ID: &str = "creatorId";
    pub const CREATED_AT: &str = "createdAt";
    pub const FOLLOWER: &str = "follower";
    pub const FOLLOWEE: &str = "followee";
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Record, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[record(collection = "users")]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[record(id)]
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub search_keywords: Vec<String>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let search_keywords = search_keywords(&name);
        Self {
            id: String::new(),
            name,
            search_keywords,
        }
    }

    /// Changes the display name and rebuilds the prefix index with it.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.search_keywords = search_keywords(&self.name);
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if is_present(&self.name) {
            Ok(())
        } else {
            Err(ValidationError::single("name", "required", "name must not be empty"))
        }
    }
}

/// Lowercase prefixes of `name`, shortest first: `"Ann"` gives `["a", "an", "ann"]`.
pub fn search_keywords(name: &str) -> Vec<String> {
    let lowered = name.trim().to_lowercase();
    let mut keywords: Vec<String> = Vec::new();
    let mut prefix = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        prefix.push(ch);
        if !keywords.iter().any(|existing| existing == &prefix) {
            keywords.push(prefix.clone());
        }
    }
    keywords
}

#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

static COORDINATES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$").expect("coordinate pattern is valid")
});

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            issues.push(ValidationIssue::new(
                "location.latitude",
                "range",
                "latitude must be within [-90, 90]",
            ));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            issues.push(ValidationIssue::new(
                "location.longitude",
                "range",
                "longitude must be within [-180, 180]",
            ));
        }
        ValidationError::new(issues).into_result()
    }
}

impl FromStr for GeoPoint {
    type Err = ValidationError;

    /// Parses `"lat,lng"`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::single("location", "format", "expected `latitude,longitude`");
        let captures = COORDINATES.captures(value).ok_or_else(invalid)?;
        let latitude = captures[1].parse::<f64>().map_err(|_| invalid())?;
        let longitude = captures[2].parse::<f64>().map_err(|_| invalid())?;
        let point = Self::new(latitude, longitude);
        point.validate()?;
        Ok(point)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// A geo-tagged walk. Equality covers every field, id included.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Record, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[record(collection = "posts")]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[record(id)]
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub creator_id: String,
    pub location: GeoPoint,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// A post not yet written to the store: empty id, stamped now at the stored millisecond
    /// precision.
    pub fn draft(title: impl Into<String>, creator_id: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            creator_id: creator_id.into(),
            location,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();
        if !is_present(&self.title) {
            issues.push(ValidationIssue::new("title", "required", "title must not be empty"));
        }
        if let Err(location) = self.location.validate() {
            issues.extend(location.issues);
        }
        ValidationError::new(issues).into_result()
    }

    /// Compares everything except the store-assigned id.
    pub fn same_content(&self, other: &Post) -> bool {
        self.title == other.title
            && self.creator_id == other.creator_id
            && self.location == other.location
            && self.created_at == other.created_at
    }
}

/// Directed follow edge, keyed `"{follower}_{followee}"`. The document's existence is the
/// relationship.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Record, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[record(collection = "follows")]
pub struct Follow {
    #[record(id)]
    #[serde(default)]
    pub id: String,
    pub follower: String,
    pub followee: String,
}

impl Follow {
    pub fn new(follower: impl Into<String>, followee: impl Into<String>) -> Self {
        let follower = follower.into();
        let followee = followee.into();
        Self {
            id: Self::edge_id(&follower, &followee),
            follower,
            followee,
        }
    }

    pub fn edge_id(follower: &str, followee: &str) -> String {
        format!("{follower}_{followee}")
    }
}
