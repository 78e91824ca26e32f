//! Media catalog: folder scanning into ordered asset lists.

mod scan;

pub use scan::{AssetList, Catalogs, MediaKind, scan_folder};
