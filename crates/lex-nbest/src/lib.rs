pub mod converter;
pub mod dict;
pub mod settings;
