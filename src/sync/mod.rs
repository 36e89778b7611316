pub mod barrier;

pub use self::barrier::*;

#[cfg(test)]
mod tests;
