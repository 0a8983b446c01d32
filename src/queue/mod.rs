mod registry;
mod watch_queue;
pub use registry::*;
pub use watch_queue::*;

#[cfg(test)]
mod registry_test;
#[cfg(test)]
mod watch_queue_test;
