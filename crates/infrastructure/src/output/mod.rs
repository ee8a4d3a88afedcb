pub mod jsonl;
pub mod progress;

pub use jsonl::{write_name_list, JsonLinesWriter};
pub use progress::ScanProgressBar;
