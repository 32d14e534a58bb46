pub mod config;
pub mod db;
pub mod error;
pub mod server;

pub use config::Config;
pub use db::{DatabaseName, DriverKind, Handler, HandlerManager, TableName};
pub use error::{BenchError, BenchResult};
pub use server::create_router;
