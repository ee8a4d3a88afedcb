pub mod maxmind;

pub use maxmind::MaxMindCountryReader;
