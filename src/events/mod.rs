//! Cache invalidation events
//!
//! Role and assignment mutations publish a [`RoleEvent`] on the [`EventBus`];
//! one [`InvalidationListener`] per [`EventClass`] consumes them and
//! recomputes the caches of the affected users.

mod bus;
mod listener;
mod types;


pub use bus::{EventBus, Subscription};
pub use listener::InvalidationListener;
pub use types::{EventClass, RoleEvent};
