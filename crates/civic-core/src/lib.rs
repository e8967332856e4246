//! Session core of the civic portal: identity, the complaint and discussion
//! stores, and the read models derived from them.

pub mod clock;
pub mod complaints;
pub mod dashboard;
pub mod discussions;
pub mod error;
pub mod identity;
pub mod notices;
pub mod notifications;
pub mod portal;
pub mod projections;
pub mod receipts;
pub mod seed;
pub(crate) mod snapshot;
pub(crate) mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use complaints::{ComplaintStore, StatusUpdate, TransitionPolicy};
pub use discussions::{DiscussionStore, LikeState};
pub use error::{CivicError, Result};
pub use portal::{Portal, PortalConfig};
pub use projections::{ComplaintFilter, DiscussionFilter, DiscussionSort};
