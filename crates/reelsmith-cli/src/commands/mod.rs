pub mod context;
pub mod generate;
pub mod history;
pub mod sessions;
