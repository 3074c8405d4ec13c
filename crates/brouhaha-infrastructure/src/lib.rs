//! Filesystem-backed implementations of the Brouhaha storage capabilities.

pub mod config_service;
pub mod dto;
pub mod fs_blob_storage;
pub mod json_record_repository;
pub mod memory_geo_index;
pub mod paths;
pub mod storage;
pub mod toml_geo_index;

pub use crate::config_service::ConfigService;
pub use crate::fs_blob_storage::FsBlobStorage;
pub use crate::json_record_repository::JsonRecordRepository;
pub use crate::memory_geo_index::MemoryGeoIndex;
pub use crate::paths::{BrouhahaPaths, DataLayout};
pub use crate::toml_geo_index::TomlGeoIndex;
