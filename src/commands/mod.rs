pub mod audit;
pub mod randomize;
pub mod replay;
pub mod score;
pub mod segment;
mod store;

/// Version stamped into every JSON artifact the commands write.
pub const MANIFEST_VERSION: u32 = 1;
