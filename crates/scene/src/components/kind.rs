use crate::components::{Light, MeshGeometry};

/// What a scene-graph node is.
///
/// Groups carry no geometry of their own and only organize children.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(MeshGeometry),
    Light(Light),
    Camera,
}

impl NodeKind {
    pub fn is_group(&self) -> bool {
        matches!(self, NodeKind::Group)
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self, NodeKind::Mesh(_))
    }

    pub fn geometry(&self) -> Option<&MeshGeometry> {
        match self {
            NodeKind::Mesh(geometry) => Some(geometry),
            _ => None,
        }
    }
}
