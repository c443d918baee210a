/// State management module
///
/// This module handles all application state, including:
/// - Directory scan and the clamped image cursor (library.rs)
/// - Tag sets, toggling and the palette of known tags (tags.rs)
/// - The browsing session that ties them together (session.rs)

pub mod library;
pub mod session;
pub mod tags;
