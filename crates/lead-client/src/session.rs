use std::sync::Arc;

use crate::clock::Clock;
use crate::controller::{FormView, SubmissionController};
use crate::queue::{FlushReport, PendingQueue};
use crate::store::KeyValueStore;
use crate::transport::RelayTransport;

/// One page load: retry whatever earlier visits left behind, then hand out the form controller.
pub struct PageSession<S, V> {
    pub controller: SubmissionController<S, V>,
    pub flushed: FlushReport,
}

impl<S, V> PageSession<S, V>
where
    S: KeyValueStore,
    V: FormView,
{
    pub async fn open(
        store: S,
        transport: Arc<dyn RelayTransport>,
        view: V,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let queue = PendingQueue::new(store, clock.clone());
        let flushed = queue.flush(&transport).await;
        Self {
            controller: SubmissionController::new(queue, transport, view, clock),
            flushed,
        }
    }
}
