pub mod connection;
pub mod entity;
pub mod error;
pub mod repository;
pub mod seed;
pub mod vocab;

pub use connection::establish_connection;
pub use error::StorageError;
