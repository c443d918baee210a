/// UI helpers
///
/// - `preview.rs` - decoding and downscaling the displayed picture

pub mod preview;
