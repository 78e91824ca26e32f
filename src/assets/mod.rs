//! Image decoding, asynchronous loading and external media probing.

pub mod decode;
pub mod loader;
pub mod media;

pub use decode::{PreparedImage, decode_image, read_image};
pub use loader::{
    AssetLoader, DecodeFn, InlineLoader, LoadCompletion, LoadRequest, NullLoader, PooledLoader,
};
