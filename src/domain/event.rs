//! Event, venue, category and speaker records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, EventId, SpeakerId, Subscription, UserId, VenueId};

/// An event as listed in the feed.
///
/// Owned by its organizer; the backend enforces that only the organizer
/// mutates it. Category links, speaker links and subscriptions are
/// read-only denormalized views attached by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub is_paid: bool,
    /// Price in whole currency units; meaningful only when `is_paid`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    pub organizer_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<OrganizerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<VenueId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub categories: Vec<CategoryLink>,
    #[serde(default)]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl Event {
    /// Price owed on subscribe: the listed price for paid events, zero
    /// otherwise.
    pub fn charge(&self) -> i64 {
        if self.is_paid {
            self.price.unwrap_or(0)
        } else {
            0
        }
    }
}

/// Denormalized organizer view embedded in event listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerSummary {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Category link attached to an event listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLink {
    pub category: Category,
}

/// A venue where events take place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// An event category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A speaker profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Speaker {
    pub id: SpeakerId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A role record from the roles catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: i64,
    pub name: String,
}

/// Join record linking an event to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCategory {
    pub id: i64,
    pub event_id: EventId,
    pub category_id: CategoryId,
}

/// Join record linking an event to a speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSpeaker {
    pub id: i64,
    pub event_id: EventId,
    pub speaker_id: SpeakerId,
}
