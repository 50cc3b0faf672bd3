pub mod settings;
pub mod sqlite;

pub use settings::Settings;
