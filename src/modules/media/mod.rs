pub mod keys;
pub mod probe;
pub mod storage;
pub mod upload;
