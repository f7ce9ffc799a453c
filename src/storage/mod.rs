pub mod bucket;
pub mod layout;
