mod allocator;
pub use allocator::*;
