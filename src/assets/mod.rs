//! Asset Fetching
//!
//! Byte-level access to scene files. Fetches run on a shared background
//! runtime and hand their result to whoever polls the [`PendingLoad`],
//! normally the render loop.
//!
//! - [`AssetReader`]: async byte source
//! - [`AssetReaderVariant`]: file or in-memory reader
//! - [`fetch_scene`]: scene plus dependency fetch

pub mod fetch;
pub mod io;

pub use fetch::{FetchedScene, PendingLoad, fetch_scene};
pub use io::{AssetReader, AssetReaderVariant, FileAssetReader, MemoryAssetReader};
