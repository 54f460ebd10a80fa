//! Delivery of router output to connections.

use crate::domain::{Delivery, MessagePusher};

/// Push every delivery, in order. Failures are logged and skipped.
///
/// A failed push means the recipient is going away; its own disconnect
/// cleans up the router state.
///
/// Returns the number of deliveries that were handed to the transport.
pub(crate) async fn push_deliveries(
    message_pusher: &dyn MessagePusher,
    deliveries: Vec<Delivery>,
) -> usize {
    let mut pushed = 0;
    for Delivery { to, event } in deliveries {
        match message_pusher.push_to(&to, event).await {
            Ok(()) => pushed += 1,
            Err(e) => tracing::warn!("Failed to push to '{}': {}", to, e),
        }
    }
    pushed
}
