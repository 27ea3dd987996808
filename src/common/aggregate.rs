use crate::common::DomainEvent;
use serde::{Deserialize, Serialize};

/// An entity that records what happened to it as a list of domain events.
///
/// Events are appended while commands run and drained by whoever persists
/// them (see `mark_events_as_committed`).
pub trait AggregateRoot: Send + Sync {
    type Event: DomainEvent + Serialize + for<'de> Deserialize<'de>;

    fn aggregate_id(&self) -> &str;
    fn aggregate_type(&self) -> &'static str;
    fn version(&self) -> u64;

    /// Get uncommitted events
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Mark events as committed
    fn mark_events_as_committed(&mut self);

    /// Add a new event to the uncommitted events list
    fn add_event(&mut self, event: Self::Event);
}
