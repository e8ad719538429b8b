//! Data models for Bridge participant listings.
//!
//! - `Participant`: typed view of one participant row
//! - `ParticipantPage`: one page of the offset-paginated listing
//! - `ParticipantTable`: rows accumulated across pages, columns unioned

pub mod participant;
pub mod table;

pub use participant::{Participant, ParticipantPage};
pub use table::ParticipantTable;
