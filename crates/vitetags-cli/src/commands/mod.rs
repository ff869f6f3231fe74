pub mod check;
pub mod probe;
pub mod resolve;
pub mod version;
