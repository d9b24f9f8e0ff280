//! Translation between the foreign and native protocols

pub mod request;
pub mod response;
pub mod stream;
