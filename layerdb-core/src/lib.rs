mod connection;
mod context;
mod convert;
mod driver;
mod error;
mod named_value;
mod rows;
mod statement;
mod transaction;
mod util;
mod value;

pub use ::async_trait::async_trait;
pub use connection::*;
pub use context::*;
pub use convert::*;
pub use driver::*;
pub use error::*;
pub use named_value::*;
pub use rows::*;
pub use statement::*;
pub use transaction::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
