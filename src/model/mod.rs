pub mod attendance;
pub mod intern;
pub mod month;
pub mod role;
pub mod user;
