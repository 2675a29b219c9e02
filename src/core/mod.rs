pub mod cancel;
pub mod job;
pub mod manager;
pub mod queue;
pub mod worker;
