pub mod locks;
pub mod records;
