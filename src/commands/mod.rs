//! Command Surface (spec §4.D): one trait per command family, each
//! implemented for [`Client`](crate::client::Client). Every method builds
//! its RESP arguments with [`translate`](crate::translate), applies the
//! configured key prefix, and converts the driver's [`Value`](crate::value::Value)
//! back into a typed Rust result the way ioredis converts Buffers/strings
//! back into JS values.

pub mod bitmaps;
pub mod geo;
pub mod hashes;
pub mod hyperloglog;
pub mod json;
pub mod keys;
pub mod lists;
pub mod server;
pub mod sets;
pub mod sorted_sets;
pub mod streams;
pub mod strings;

pub use bitmaps::BitmapCommands;
pub use geo::GeoCommands;
pub use hashes::HashCommands;
pub use hyperloglog::HyperLogLogCommands;
pub use json::JsonCommands;
pub use keys::KeyCommands;
pub use lists::ListCommands;
pub use server::ServerCommands;
pub use sets::SetCommands;
pub use sorted_sets::SortedSetCommands;
pub use streams::StreamCommands;
pub use strings::StringCommands;
