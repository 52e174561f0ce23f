//! Minimal DER (ASN.1) decoder
//!
//! Decodes a DER buffer into an arena of tag-length-value nodes addressed by
//! index. Parsing uses an explicit work stack instead of recursion, so nesting
//! depth is bounded only by the input size, and every declared length is
//! checked against its enclosing bound before any byte of the value is read.

use crate::utils::Asn1Error;
use std::ops::Range;

/// OBJECT IDENTIFIER tag number
pub const TAG_OID: u8 = 0x06;
/// SEQUENCE tag number
pub const TAG_SEQUENCE: u8 = 0x10;

const CONSTRUCTED_BIT: u8 = 0x20;
const TAG_NUMBER_MASK: u8 = 0x1f;
const LONG_FORM_BIT: u8 = 0x80;

/// Index of a node inside an [`Asn1Tree`]
pub type NodeId = usize;

/// A decoded TLV element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asn1Node {
    /// Raw tag byte (class, constructed bit and tag number)
    pub tag: u8,
    pub constructed: bool,
    /// Declared value length
    pub length: usize,
    /// Header plus value length
    pub total_length: usize,
    /// Offset of the tag byte within the decoded buffer
    pub offset: usize,
    pub children: Vec<NodeId>,
    value: Range<usize>,
}

impl Asn1Node {
    /// Tag number with the class and constructed bits masked off
    pub fn tag_number(&self) -> u8 {
        self.tag & TAG_NUMBER_MASK
    }
}

/// Arena of decoded nodes borrowing the original buffer
#[derive(Debug, Clone)]
pub struct Asn1Tree<'a> {
    data: &'a [u8],
    nodes: Vec<Asn1Node>,
    roots: Vec<NodeId>,
}

struct Header {
    tag: u8,
    header_len: usize,
    length: usize,
}

/// Pending sibling run: children of `parent` within `cursor..end`
struct Frame {
    parent: Option<NodeId>,
    cursor: usize,
    end: usize,
}

impl<'a> Asn1Tree<'a> {
    /// Decode every top-level element of `data`.
    ///
    /// Fails on the first element whose header is truncated or whose declared
    /// length runs past its enclosing element (or the buffer).
    pub fn parse(data: &'a [u8]) -> Result<Self, Asn1Error> {
        let mut nodes: Vec<Asn1Node> = Vec::new();
        let mut roots = Vec::new();
        let mut stack = vec![Frame {
            parent: None,
            cursor: 0,
            end: data.len(),
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.cursor >= frame.end {
                stack.pop();
                continue;
            }

            let offset = frame.cursor;
            let header = read_header(data, offset, frame.end)?;
            let value_start = offset + header.header_len;
            let value_end = value_start + header.length;
            // Every header is at least two bytes, so the cursor always advances
            frame.cursor = value_end;
            let parent = frame.parent;

            let id = nodes.len();
            let constructed = header.tag & CONSTRUCTED_BIT != 0;
            nodes.push(Asn1Node {
                tag: header.tag,
                constructed,
                length: header.length,
                total_length: header.header_len + header.length,
                offset,
                children: Vec::new(),
                value: value_start..value_end,
            });

            match parent {
                Some(parent) => nodes[parent].children.push(id),
                None => roots.push(id),
            }

            if constructed && header.length > 0 {
                stack.push(Frame {
                    parent: Some(id),
                    cursor: value_start,
                    end: value_end,
                });
            }
        }

        Ok(Self { data, nodes, roots })
    }

    /// Top-level elements in buffer order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Asn1Node> {
        self.nodes.get(id)
    }

    /// Value bytes of a node (empty for an unknown id)
    pub fn value(&self, id: NodeId) -> &'a [u8] {
        self.nodes
            .get(id)
            .and_then(|node| self.data.get(node.value.clone()))
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order traversal: a node, then its children in document order,
    /// before its next sibling
    pub fn depth_first(&self) -> DepthFirst<'_, 'a> {
        DepthFirst {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }
}

/// Iterator returned by [`Asn1Tree::depth_first`]
pub struct DepthFirst<'t, 'a> {
    tree: &'t Asn1Tree<'a>,
    stack: Vec<NodeId>,
}

impl<'t, 'a> Iterator for DepthFirst<'t, 'a> {
    type Item = (NodeId, &'t Asn1Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.nodes.get(id)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}

fn read_header(data: &[u8], offset: usize, end: usize) -> Result<Header, Asn1Error> {
    let available = end.saturating_sub(offset);
    if available < 2 {
        return Err(Asn1Error::TruncatedHeader { offset });
    }

    let tag = data[offset];
    let first = data[offset + 1];

    let (length, header_len) = if first & LONG_FORM_BIT == 0 {
        (usize::from(first), 2)
    } else {
        let count = usize::from(first & !LONG_FORM_BIT);
        if count == 0 {
            return Err(Asn1Error::IndefiniteLength { offset });
        }
        if count > std::mem::size_of::<usize>() {
            return Err(Asn1Error::LengthTooWide {
                offset,
                bytes: count,
            });
        }
        if available < 2 + count {
            return Err(Asn1Error::TruncatedHeader { offset });
        }
        let length = data[offset + 2..offset + 2 + count]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | usize::from(b));
        (length, 2 + count)
    };

    let remaining = available - header_len;
    if length > remaining {
        return Err(Asn1Error::LengthOutOfBounds {
            offset,
            declared: length,
            available: remaining,
        });
    }

    Ok(Header {
        tag,
        header_len,
        length,
    })
}
