//! DNS wire codec backed by a [`MessagePool`].

use super::message_pool::{MessagePool, PooledBuffer};
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use nsgeo_domain::QueryError;
use std::sync::Arc;

#[derive(Clone)]
pub struct MessageCodec {
    pool: Arc<MessagePool>,
}

impl MessageCodec {
    pub fn new(pool: Arc<MessagePool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<MessagePool> {
        &self.pool
    }

    /// Serializes a single-question message into a pooled buffer.
    ///
    /// The buffer goes back to the pool when the returned guard is dropped,
    /// including when encoding fails halfway.
    pub fn pack(&self, message: &Message) -> Result<PooledBuffer, QueryError> {
        let questions = message.queries().len();
        if questions != 1 {
            return Err(QueryError::Encode(format!(
                "expected exactly one question, got {}",
                questions
            )));
        }

        let mut buffer = self.pool.checkout();
        {
            let mut encoder = BinEncoder::new(buffer.as_mut_vec());
            message
                .emit(&mut encoder)
                .map_err(|e| QueryError::Encode(e.to_string()))?;
        }
        Ok(buffer)
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<Message, QueryError> {
        Message::from_vec(bytes).map_err(|e| QueryError::Decode(e.to_string()))
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(Arc::new(MessagePool::default()))
    }
}
