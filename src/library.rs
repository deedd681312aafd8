//! Track data and the locally kept track lists.
//!
//! `RecentList` and `LikedSet` hold the recently played and liked tracks;
//! `LocalCache` mirrors them to JSON files in the data directory.

mod liked;
mod model;
mod recent;
mod store;

pub use liked::{LikeAction, LikeSettlement, LikeTicket, LikedSet};
pub use model::{Playlist, Track};
pub use recent::{RECENT_LIMIT, RecentList};
pub use store::{LocalCache, StoreError};
