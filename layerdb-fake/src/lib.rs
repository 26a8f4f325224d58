mod backend;
mod connection;
mod driver;
mod statement;
mod transaction;

pub use backend::{
    BeginHook, Call, ExecHook, FakeCapabilities, PingHook, QueryHook, Via, echo, rows,
};
pub use connection::*;
pub use driver::*;
pub use statement::*;
pub use transaction::*;
