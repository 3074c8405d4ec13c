pub mod context;
pub mod list;
pub mod load;
pub mod nearby;
pub mod save;
