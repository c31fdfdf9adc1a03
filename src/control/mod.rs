pub mod deployment;
pub mod environment;
pub mod scenario;
