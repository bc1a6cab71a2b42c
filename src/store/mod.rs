//! Client-side caches over the backend listings

mod catalog;
mod category;
mod subscription;

pub use catalog::{
    CatalogEntity, CatalogStore, EventCategoryStore, EventSpeakerStore, EventStore, RoleStore,
    SpeakerStore, UserStore, VenueStore,
};
pub use category::CategoryStore;
pub use subscription::SubscriptionStore;
