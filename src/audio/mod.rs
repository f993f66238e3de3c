//! Audio file handling: WAV decode, encode and resampling helpers.

pub mod wav;
