pub mod preprocess;
pub mod scan;
