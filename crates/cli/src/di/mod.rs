pub mod scan;

pub use scan::ScanServices;
