//! File storage primitives shared by the repositories.

pub mod atomic_toml;

pub use atomic_toml::AtomicTomlFile;
