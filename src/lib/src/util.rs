pub mod fs;
pub mod hasher;
