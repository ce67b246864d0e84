pub mod heuristics;
pub mod listing;

pub use heuristics::parse_housing;
pub use listing::{new_listings, Listing, ListingSet};
