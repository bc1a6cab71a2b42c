//! REST route table, relative to the configured base URL

pub const USERS: &str = "/users";
pub const CATEGORIES: &str = "/categories";
pub const EVENT_CATEGORIES: &str = "/event-categories";
pub const EVENTS: &str = "/events";
pub const EVENT_SPEAKERS: &str = "/event-speakers";
pub const ROLES: &str = "/roles";
pub const SPEAKERS: &str = "/speakers";
pub const SUBSCRIPTIONS: &str = "/subscriptions";
pub const TRANSACTIONS: &str = "/transactions";
pub const VENUES: &str = "/venues";
pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const ROLE_CHANGE_REQUESTS: &str = "/role-change-requests";
