pub mod atomic;
pub mod config;
pub mod convert;
pub mod error;
pub mod groups;
pub mod ingest;
pub mod mock;
pub mod outputs;
pub mod schema;
pub mod vaep;
pub mod vocab;
