use std::fmt;

/// Wrapper for a Java network entity ID, as assigned by the server.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JavaEntityId(i32);

impl JavaEntityId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for JavaEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "java#{}", self.0)
    }
}

/// Wrapper for a Bedrock entity ID, allocated by the gateway.
///
/// Bedrock addresses an entity by a "runtime" and a "unique" id.
/// The gateway uses the same value for both.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BedrockEntityId(u64);

impl BedrockEntityId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn runtime_id(self) -> u64 {
        self.0
    }

    pub fn unique_id(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Display for BedrockEntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bedrock#{}", self.0)
    }
}
