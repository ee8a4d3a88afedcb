//! Builds outgoing recursive queries.

use super::record_type_map::RecordTypeMapper;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::Name;
use nsgeo_domain::{DomainError, RecordType};

pub const DEFAULT_EDNS_PAYLOAD: u16 = 1200;

pub struct MessageBuilder;

impl MessageBuilder {
    /// A recursion-desired query for `name` with a single question and an
    /// EDNS(0) OPT record advertising `edns_payload` bytes.
    pub fn build_query(
        id: u16,
        name: &str,
        record_type: RecordType,
        edns_payload: u16,
    ) -> Result<Message, DomainError> {
        let name = Name::from_ascii(name).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", name, e))
        })?;

        let mut edns = Edns::new();
        edns.set_max_payload(edns_payload);

        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(Query::query(name, RecordTypeMapper::to_hickory(record_type)));
        message.set_edns(edns);

        Ok(message)
    }
}
