//! Position tracking in the image list.

mod cursor;

pub use cursor::PlaylistCursor;
