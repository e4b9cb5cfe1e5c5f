pub mod config;
pub mod error;
pub mod ingestion;
pub mod observability;
pub mod resolver;
pub mod server;
pub mod storage;
pub mod summary;
pub mod table;

pub use error::{QaError, Result};
pub use resolver::{resolve, Intent, QueryResult};
pub use table::{Cell, Column, ColumnKind, Row, Table};
