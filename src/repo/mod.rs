//! SQL access, one module per table. Functions that may run inside a bulk
//! transaction take any SQLite executor; the rest take the pool.
pub mod attendance;
pub mod intern;
pub mod user;
