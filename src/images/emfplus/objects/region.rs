//! Region objects.
//!
//! A region is a binary tree of nodes stored in pre-order: a combine node is
//! followed by its left subtree, then its right subtree. The tree is decoded
//! into a flat arena where combine nodes refer to their children by index, so
//! deeply nested input never recurses on the call stack.

use super::path::PathObject;
use crate::common::binary::BinaryCursor;
use crate::common::error::{Error, Result};
use crate::images::emfplus::header::RecordType;
use crate::images::emfplus::types::{Decode, GraphicsVersion, RectF, ensure_elements};
use serde::Serialize;
use smallvec::SmallVec;

wire_enum! {
    pub enum RegionNodeType: u32 {
        And = 0x0000_0001,
        Or = 0x0000_0002,
        Xor = 0x0000_0003,
        Exclude = 0x0000_0004,
        Complement = 0x0000_0005,
        Rect = 0x1000_0000,
        Path = 0x1000_0001,
        Empty = 0x1000_0002,
        Infinite = 0x1000_0003,
    }
}

impl RegionNodeType {
    pub fn is_combine(self) -> bool {
        (self as u32) < 0x1000_0000
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RegionNode {
    Combine {
        op: RegionNodeType,
        left: usize,
        right: usize,
    },
    Rect(RectF),
    Path(PathObject),
    Empty,
    Infinite,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionObject {
    pub version: GraphicsVersion,
    /// Nodes in stream order; index 0 is the root
    pub nodes: Vec<RegionNode>,
}

impl RegionObject {
    pub fn root(&self) -> Option<&RegionNode> {
        self.nodes.first()
    }

    pub(crate) fn decode_from(cursor: &mut BinaryCursor<'_>) -> Result<Self> {
        let version = GraphicsVersion::decode(cursor)?;
        let offset = cursor.position();
        let node_count = cursor.read_u32()? as usize;
        let declared = node_count.checked_add(1).ok_or(Error::SizeInvariantViolation {
            offset,
            record: RecordType::Object,
            detail: "RegionNodeCount overflows".into(),
        })?;
        ensure_elements(cursor, declared, 4)?;

        Ok(Self {
            version,
            nodes: decode_nodes(cursor, declared)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenCombine {
    index: usize,
    has_left: bool,
}

fn decode_nodes(cursor: &mut BinaryCursor<'_>, declared: usize) -> Result<Vec<RegionNode>> {
    let mut nodes = Vec::with_capacity(declared);
    let mut open: SmallVec<[OpenCombine; 16]> = SmallVec::new();

    loop {
        let offset = cursor.position();
        if nodes.len() == declared {
            return Err(region_violation(
                offset,
                format!("node tree has more than the {declared} declared nodes"),
            ));
        }

        let node_type = RegionNodeType::parse("RegionNodeType", cursor.read_u32()?, offset)?;
        let index = nodes.len();
        let node = match node_type {
            RegionNodeType::Rect => RegionNode::Rect(RectF::decode(cursor)?),
            RegionNodeType::Path => {
                let length = cursor.read_u32()? as usize;
                let mut path = cursor.sub_cursor(length)?;
                RegionNode::Path(PathObject::decode_from(&mut path)?)
            },
            RegionNodeType::Empty => RegionNode::Empty,
            RegionNodeType::Infinite => RegionNode::Infinite,
            op => {
                nodes.push(RegionNode::Combine {
                    op,
                    left: 0,
                    right: 0,
                });
                open.push(OpenCombine {
                    index,
                    has_left: false,
                });
                continue;
            },
        };
        nodes.push(node);

        // Hang the finished subtree under the innermost open combine node,
        // closing every combine node whose right child is now complete.
        let mut child = index;
        loop {
            let Some(parent) = open.last_mut() else {
                if nodes.len() != declared {
                    return Err(region_violation(
                        cursor.position(),
                        format!("node tree has {} of {declared} declared nodes", nodes.len()),
                    ));
                }
                return Ok(nodes);
            };
            let slot = parent.index;
            if !parent.has_left {
                parent.has_left = true;
                set_child(&mut nodes[slot], child, true);
                break;
            }
            set_child(&mut nodes[slot], child, false);
            open.pop();
            child = slot;
        }
    }
}

fn set_child(node: &mut RegionNode, child: usize, is_left: bool) {
    if let RegionNode::Combine { left, right, .. } = node {
        if is_left {
            *left = child;
        } else {
            *right = child;
        }
    }
}

fn region_violation(offset: usize, detail: String) -> Error {
    Error::SizeInvariantViolation {
        offset,
        record: RecordType::Object,
        detail,
    }
}
