use thiserror::Error;

/// Hard failures of a routing request. Lookups that simply miss are reported
/// with `Option` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("entry is already in the priority queue")]
    DuplicateQueueEntry,
    #[error("entry is not in the priority queue")]
    UnknownQueueEntry,
    #[error("search algorithm {algorithm} is not implemented")]
    NotImplemented { algorithm: &'static str },
    #[error("no routing vertex at ({x}, {y})")]
    UnknownVertex { x: f64, y: f64 },
}
