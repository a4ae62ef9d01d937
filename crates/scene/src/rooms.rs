//! Rooms are group nodes named `r_<snake_case_name>`.

use std::fmt;
use std::str::FromStr;

use crate::World;
use crate::components::NodeKind;
use crate::node::{NodeId, ParseNodeIdError};

pub const ROOM_PREFIX: &str = "r_";

/// Room identity, taken from the originating group node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub NodeId);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RoomId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(RoomId)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    /// Display label, e.g. `"Living Room"`.
    pub name: String,
    pub group: NodeId,
    /// Mesh descendants of `group` in traversal order. May be empty.
    pub meshes: Vec<NodeId>,
}

impl Room {
    pub fn is_degenerate(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Collects one [`Room`] per room group under `model_root` (inclusive),
/// in depth-first encounter order.
pub fn extract_rooms(world: &World, model_root: NodeId) -> Vec<Room> {
    let rooms: Vec<Room> = world
        .traverse(model_root)
        .filter(|&node| world.kind(node).is_some_and(NodeKind::is_group))
        .filter_map(|node| {
            let name = room_display_name(world.name(node)?)?;
            Some(Room {
                id: RoomId(node),
                name,
                group: node,
                meshes: world.meshes_under(node),
            })
        })
        .collect();

    tracing::debug!("extracted {} rooms", rooms.len());
    rooms
}

/// Display label for a room node name, or `None` when `raw` is not a room name.
///
/// `"r_living_room"` becomes `"Living Room"`: the prefix is dropped, every `_`
/// becomes a space, and the first character of each whitespace-delimited word is
/// upper-cased. Other characters (and runs of spaces) are kept as they are.
pub fn room_display_name(raw: &str) -> Option<String> {
    let rest = raw.strip_prefix(ROOM_PREFIX)?;
    let spaced = rest.replace('_', " ");

    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    Some(out)
}
