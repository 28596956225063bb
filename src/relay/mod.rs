//! The `relay` module is the fan-out engine: the channel registry, the
//! per-channel pump, and the subscriber handles it delivers to.

pub mod channel;
pub mod registry;
pub mod subscriber;

pub use channel::Channel;
pub use registry::Registry;
pub use subscriber::Subscriber;
