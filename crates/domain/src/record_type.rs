use std::fmt;

/// Record types the scanner asks upstream resolvers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
    NS,
    SOA,
}

impl RecordType {
    /// Address record types queried for every selected nameserver.
    pub const ADDRESS_TYPES: [RecordType; 2] = [RecordType::A, RecordType::AAAA];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::NS => "NS",
            RecordType::SOA => "SOA",
        }
    }

    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::AAAA)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
