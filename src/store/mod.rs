pub mod directory;
pub mod metadata;
pub mod weights;
