pub mod responder;
pub mod storage;
