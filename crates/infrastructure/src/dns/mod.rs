pub mod client;
pub mod codec;
pub mod lookup;
pub mod message_builder;
pub mod message_pool;
pub mod record_type_map;
pub mod socket;
pub mod upstream;

pub use client::{ClientOptions, DnsClient, Response};
pub use codec::MessageCodec;
pub use lookup::UpstreamResolver;
pub use message_builder::{MessageBuilder, DEFAULT_EDNS_PAYLOAD};
pub use message_pool::{MessagePool, PoolStats, PooledBuffer};
pub use record_type_map::RecordTypeMapper;
pub use socket::bind_for;
pub use upstream::UpstreamSet;
