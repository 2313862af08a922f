//! # JSON Storage Module
//!
//! Persists the occurrence collection as a single pretty-printed JSON file
//! under the data directory, the direct analogue of the browser-local
//! key-value slot the application originally used.
//!
//! ## File Format
//!
//! `ocorrencias.json` holds a JSON array of occurrence objects with
//! camelCase field names and pt-BR enum labels, the same shape a backup
//! file has. Writes go through a temp file plus rename so a failed write
//! never corrupts the existing blob.

pub mod connection;
pub mod occurrence_repository;

pub use connection::JsonConnection;
pub use occurrence_repository::OccurrenceRepository;
