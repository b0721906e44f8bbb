pub mod config;
pub mod responder;
pub mod seed;
pub mod storage;
