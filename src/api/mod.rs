pub mod attendance;
pub mod intern;
pub mod me;
pub mod report;
