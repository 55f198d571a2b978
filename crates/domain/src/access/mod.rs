//! Access control: the pure policy and the route guard built on it.

mod policy;
mod route;

pub use policy::{AccessDecision, AccessPolicy};
pub use route::{GuardState, RouteGuard, RouteRequirement};
