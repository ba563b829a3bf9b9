//! Projection of a tree plus its layout into flat render lists.

use mindfold_core::{Direction, LayoutMap, NodeId, OutlineNode, Point, Tree};

/// One renderable node.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    pub id: NodeId,
    pub label: String,
    pub depth: usize,
    /// World position; origin when the node has no layout entry yet.
    pub position: Point,
    /// Side the node lays out toward; `None` for roots.
    pub direction: Option<Direction>,
    pub has_children: bool,
    pub expanded: bool,
    /// 1-indexed line in the outline text this node came from.
    pub source_line: Option<usize>,
}

/// A parent→child connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Side of the parent the connector leaves from.
    pub side: Direction,
}

/// Flat node and edge lists in preorder, ready to render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

/// Project the visible part of a tree.
///
/// A collapsed node still appears; its descendants (and their edges) do
/// not. Nodes without a layout entry render at the origin, expanded.
#[must_use]
pub fn project(tree: &Tree, layout: &LayoutMap) -> Projection {
    let mut out = Projection::default();
    for root in tree.roots() {
        visit(root, None, Direction::Right, layout, &mut out);
    }
    out
}

fn visit(
    node: &OutlineNode,
    parent: Option<&NodeId>,
    inherited: Direction,
    layout: &LayoutMap,
    out: &mut Projection,
) {
    let meta = layout.get(node.id.as_str());
    let expanded = meta.is_none_or(|m| m.expanded);
    let direction = if node.depth == 1 {
        meta.and_then(|m| m.direction).unwrap_or(inherited)
    } else {
        inherited
    };

    out.nodes.push(DiagramNode {
        id: node.id.clone(),
        label: node.text.clone(),
        depth: node.depth,
        position: meta.map_or(Point::ORIGIN, |m| m.position),
        direction: (node.depth > 0).then_some(direction),
        has_children: node.has_children(),
        expanded,
        source_line: node.source_line,
    });

    if let Some(parent) = parent {
        out.edges.push(DiagramEdge {
            source: parent.clone(),
            target: node.id.clone(),
            side: direction,
        });
    }

    if expanded {
        for child in &node.children {
            visit(child, Some(&node.id), direction, layout, out);
        }
    }
}
