pub mod availability;
pub mod day;
pub mod duration;
pub mod gig;
pub mod ids;
pub mod member;
pub mod setlist;
pub mod song;

pub use availability::{AvailabilityEntry, AvailabilityStatus};
pub use day::DayKey;
pub use duration::SongDuration;
pub use gig::{Gig, GigComment, GigStatus, LineupSlot};
pub use ids::{GigId, MemberId, SetlistId, SongId, UserId};
pub use member::BandMember;
pub use setlist::{Setlist, SetlistMetadata, SetlistOrigin};
pub use song::{Energy, Language, Song, SongFilter, Vocalist};
