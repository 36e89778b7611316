pub mod core;
pub mod file;
pub mod sample;
pub mod worker;

pub use self::core::*;
pub use self::file::*;
pub use self::sample::*;
