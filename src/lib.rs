pub mod error;
pub mod int;
pub mod dim;
pub mod storage;
pub mod info;
pub mod regular;
pub mod cursor;
pub mod iter;
