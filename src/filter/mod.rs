mod type_filter;
pub use type_filter::*;
