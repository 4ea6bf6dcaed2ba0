/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const EVENTS_ROUTE_COMPONENT: &str = "events";
pub const EVENTS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", EVENTS_ROUTE_COMPONENT);

/// Frontend page components used when building links for announcements.
pub const FRONTEND_SETUP_PAGE: &str = "new";
pub const FRONTEND_AVAILABILITY_PAGE: &str = "availability";
pub const FRONTEND_VOTE_PAGE: &str = "vote";
