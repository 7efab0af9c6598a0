//! Landing-page side of the lead relay.
//!
//! [`controller::SubmissionController`] gates and submits the order form,
//! [`queue::PendingQueue`] keeps leads the relay could not take and retries them on the next page
//! load ([`session::PageSession::open`]).

pub mod clock;
pub mod controller;
pub mod queue;
pub mod session;
pub mod store;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{
    Field, FormData, FormView, IgnoreReason, SubmissionController, SubmitOutcome, Tone,
};
pub use queue::{DeliveryOutcome, FlushReport, PendingQueue, STORAGE_KEY};
pub use session::PageSession;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use transport::{HttpRelayClient, RelayTransport, TransportError};
