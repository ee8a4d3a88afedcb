pub mod discovery;

pub use discovery::{
    discovery_for, AuthoritativeServerDiscovery, NsRecordDiscovery, SoaPrimaryDiscovery,
};
