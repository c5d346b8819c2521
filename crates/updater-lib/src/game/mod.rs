pub mod files;
pub mod launcher;
pub mod metadata;
