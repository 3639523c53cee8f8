//! Community widgets: FAQ, poll and feedback.
//!
//! Poll and feedback state is local to this device (see [`storage`]); there
//! is no shared tally across users.

pub mod error;
pub mod faq;
pub mod feedback;
pub mod poll;
pub mod storage;

pub use error::CommunityError;
pub use feedback::{FeedbackBoard, FeedbackEntry};
pub use poll::{CommunityPoll, PollTally, VoteOutcome};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
