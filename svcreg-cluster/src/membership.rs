//! Membership provider contract.

use crate::error::ClusterError;

/// A source of live cluster members.
///
/// Implementations must be safe to call concurrently: many in-flight requests
/// select members and report failures at the same time, and callers perform no
/// locking of their own.
pub trait ClusterMembership: Send + Sync {
    /// Pick a member that is currently considered healthy.
    fn select_member(&self) -> Result<String, ClusterError>;

    /// Report that `member` failed to produce an HTTP response.
    fn mark_unhealthy(&self, member: &str);

    /// All configured members, healthy or not.
    fn members(&self) -> Vec<String>;

    /// Members currently considered healthy.
    fn healthy_members(&self) -> Vec<String>;
}

/// How a member is chosen among the healthy ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Keep using the first healthy member in configured order.
    #[default]
    Sticky,

    /// Rotate through healthy members.
    RoundRobin,

    /// Pick a healthy member at random.
    Random,
}
