use std::fmt;
use std::str::FromStr;

use foundation::handles::Handle;

/// Identity of a scene-graph node, unique within one [`World`](crate::World).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub Handle);

impl NodeId {
    pub fn index(&self) -> u32 {
        self.0.index()
    }

    pub fn generation(&self) -> u32 {
        self.0.generation()
    }
}

/// Renders as `<index>v<generation>`, e.g. `12v0`.
impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNodeIdError(pub String);

impl fmt::Display for ParseNodeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid node id: {:?}", self.0)
    }
}

impl std::error::Error for ParseNodeIdError {}

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseNodeIdError(s.to_string());
        let (index, generation) = s.split_once('v').ok_or_else(err)?;
        let index = index.parse::<u32>().map_err(|_| err())?;
        let generation = generation.parse::<u32>().map_err(|_| err())?;
        Ok(NodeId(Handle::new(index, generation)))
    }
}
