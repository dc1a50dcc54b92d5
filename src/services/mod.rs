pub mod product_file_service;

pub use product_file_service::{FileServiceError, ProductFileService};
