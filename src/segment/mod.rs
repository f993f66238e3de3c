//! Recording segmentation and converted-segment reassembly.

pub mod merger;
pub mod splitter;

pub use merger::{ConvertedSegment, merge};
pub use splitter::{Segment, split};
