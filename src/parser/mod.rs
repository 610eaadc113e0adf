pub mod dates;
pub mod markers;
pub mod split;
pub mod title;

pub use split::split_document;
