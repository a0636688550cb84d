pub mod backup;
pub mod categories;
pub mod income;
pub mod plan;
pub mod settings;
pub mod setup;
pub mod summary;
pub mod trends;
pub mod ui;
