mod watch;
mod watch_list;
pub use watch::*;
pub use watch_list::*;
