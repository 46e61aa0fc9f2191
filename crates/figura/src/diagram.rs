//! Flow diagrams: nodes arranged in columns, joined by ribbons whose
//! thickness is proportional to the flow they carry.
//!
//! Columns are inferred from the links unless a node pins its own. A node
//! is as tall as the larger of its inbound and outbound flow, and the flow
//! scale is chosen so the fullest column fits the available height.

use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;
use log::{debug, trace, warn};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
    Direction,
};
use serde::Deserialize;

use figura_core::{
    color::Color,
    draw::{
        HAlign, LabelShape, LinkPort, LinkShape, NodeShape, PlacedText, PlotIndex, Primitive,
        RenderContext, RichText, Shape, TextAlign, VAlign,
    },
    geometry::{Bounds, Point, Size},
};

use crate::{
    autofit::IdealHeight,
    error::FiguraError,
    figure::{self, Figure, FigureBase, FigureRenderer},
    pipeline,
    style::{FigureStyle, ScaledStyleResolver, StyleResolver, TextRole},
    surround::{self, MeasuredSurrounds},
    text,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInput {
    pub id: String,
    /// Display text; the id when absent.
    #[serde(default)]
    pub label: Option<String>,
    /// Pins the node to a column instead of inferring it.
    #[serde(default)]
    pub column: Option<usize>,
    #[serde(default)]
    pub color: Option<Color>,
}

impl NodeInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkInput {
    pub source: String,
    pub target: String,
    pub value: f64,
}

impl LinkInput {
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
        }
    }
}

/// Input of a flow diagram.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiagramInput {
    #[serde(flatten)]
    pub base: FigureBase,
    #[serde(default)]
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub links: Vec<LinkInput>,
}

/// The node/link graph of a diagram.
///
/// Node weights index into the input's nodes, edge weights into its links.
#[derive(Debug)]
pub struct FlowGraph<'a> {
    input: &'a DiagramInput,
    graph: DiGraph<usize, usize>,
    ids: IndexMap<&'a str, NodeIndex>,
}

impl<'a> FlowGraph<'a> {
    /// Builds the graph, dropping links whose endpoints are unknown or whose
    /// value is negative or not finite.
    pub fn new(input: &'a DiagramInput) -> Self {
        let mut graph = DiGraph::new();
        let mut ids = IndexMap::new();
        for (i, node) in input.nodes.iter().enumerate() {
            if ids.contains_key(node.id.as_str()) {
                warn!(id = node.id.as_str(); "Duplicate node id, keeping the first");
                continue;
            }
            ids.insert(node.id.as_str(), graph.add_node(i));
        }
        for (i, link) in input.links.iter().enumerate() {
            let endpoints = (
                ids.get(link.source.as_str()).copied(),
                ids.get(link.target.as_str()).copied(),
            );
            match endpoints {
                (Some(source), Some(target)) if link.value.is_finite() && link.value >= 0.0 => {
                    graph.add_edge(source, target, i);
                }
                (Some(_), Some(_)) => {
                    warn!(link = i, value = link.value; "Dropping link with invalid value");
                }
                _ => {
                    warn!(
                        link = i,
                        source = link.source.as_str(),
                        target = link.target.as_str();
                        "Dropping link to unknown node"
                    );
                }
            }
        }
        debug!(nodes = graph.node_count(), links = graph.edge_count(); "Flow graph built");
        Self { input, graph, ids }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn node(&self, index: NodeIndex) -> &'a NodeInput {
        &self.input.nodes[self.graph[index]]
    }

    fn link(&self, edge: usize) -> &'a LinkInput {
        &self.input.links[edge]
    }

    /// Nodes in input order.
    fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.ids.values().copied()
    }

    /// Links on one side of `node`, in input order.
    fn links_of(&self, node: NodeIndex, direction: Direction) -> Vec<(usize, NodeIndex)> {
        let mut links: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(node, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (*edge.weight(), other)
            })
            .collect();
        links.sort_unstable_by_key(|(link, _)| *link);
        links
    }

    fn flow(&self, node: NodeIndex, direction: Direction) -> f64 {
        self.links_of(node, direction)
            .iter()
            .map(|(link, _)| self.link(*link).value)
            .sum()
    }

    /// `max(inbound, outbound)` flow of a node.
    pub fn node_value(&self, id: &str) -> Option<f64> {
        let node = *self.ids.get(id)?;
        Some(self.value_of(node))
    }

    fn value_of(&self, node: NodeIndex) -> f64 {
        self.flow(node, Direction::Incoming)
            .max(self.flow(node, Direction::Outgoing))
    }

    /// Column of every node, keyed by id.
    pub fn columns(&self) -> IndexMap<&'a str, usize> {
        let mut memo = HashMap::new();
        let mut path = Vec::new();
        self.ids
            .iter()
            .map(|(id, node)| (*id, self.column_of(*node, &mut memo, &mut path)))
            .collect()
    }

    /// Columns renumbered densely in their original order, so pinned
    /// columns far apart take no more room than neighbouring ones.
    pub fn layout_columns(&self) -> IndexMap<&'a str, usize> {
        let columns = self.columns();
        let mut occupied: Vec<usize> = columns.values().copied().collect();
        occupied.sort_unstable();
        occupied.dedup();
        columns
            .into_iter()
            .map(|(id, column)| (id, occupied.binary_search(&column).unwrap_or(0)))
            .collect()
    }

    /// The pinned column, or one past the furthest source. A node met again
    /// on the current path (a cycle) counts as column 0.
    fn column_of(
        &self,
        node: NodeIndex,
        memo: &mut HashMap<NodeIndex, usize>,
        path: &mut Vec<NodeIndex>,
    ) -> usize {
        if let Some(column) = self.node(node).column {
            return column;
        }
        if let Some(column) = memo.get(&node) {
            return *column;
        }
        if path.contains(&node) {
            trace!(id = self.node(node).id.as_str(); "Cycle while inferring columns");
            return 0;
        }
        path.push(node);
        let sources: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .collect();
        let column = sources
            .into_iter()
            .map(|source| self.column_of(source, memo, path).saturating_add(1))
            .max()
            .unwrap_or(0);
        path.pop();
        memo.insert(node, column);
        column
    }
}

/// A node after layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: String,
    pub column: usize,
    pub bounds: Bounds,
    pub color: Color,
    pub value: f64,
}

/// A link after layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedLink {
    pub source: String,
    pub target: String,
    pub value: f64,
    pub source_port: LinkPort,
    pub target_port: LinkPort,
    pub color: Color,
}

/// A measured flow diagram.
#[derive(Debug, Clone)]
pub struct MeasuredDiagram {
    pub bounds: Bounds,
    pub style: FigureStyle,
    pub scale: f32,
    pub surrounds: MeasuredSurrounds,
    /// Pixels per unit of flow.
    pub flow_scale: f32,
    pub nodes: Vec<PositionedNode>,
    pub links: Vec<PositionedLink>,
    pub primitives: Vec<Primitive>,
}

/// Places nodes and links of `graph` inside `content`.
fn place(
    graph: &FlowGraph<'_>,
    content: Bounds,
    style: &FigureStyle,
) -> (f32, Vec<PositionedNode>, Vec<PositionedLink>) {
    let diagram = &style.diagram;
    let columns = graph.layout_columns();
    let column_count = columns.values().max().map_or(0, |c| c + 1);

    // Members of every column in input order, with their values.
    let mut members: Vec<Vec<(NodeIndex, f64)>> = vec![Vec::new(); column_count];
    for (node, column) in graph.node_indices().zip(columns.values()) {
        members[*column].push((node, graph.value_of(node)));
    }

    let height = content.height();
    let flow_scale = members
        .iter()
        .filter(|m| !m.is_empty())
        .filter_map(|m| {
            let total: f64 = m.iter().map(|(_, v)| v).sum();
            let room = height - (m.len() as f32 - 1.0) * diagram.node_gap;
            (total > 0.0).then(|| (room.max(0.0) / total as f32).max(0.0))
        })
        .reduce(f32::min)
        .unwrap_or(0.0);

    let step = if column_count > 1 {
        (content.width() - diagram.node_width) / (column_count - 1) as f32
    } else {
        0.0
    };

    let mut positions: HashMap<NodeIndex, Bounds> = HashMap::new();
    let mut nodes = Vec::new();
    for (column, members) in members.iter().enumerate() {
        let heights: Vec<f32> = members
            .iter()
            .map(|(_, value)| {
                let h = *value as f32 * flow_scale;
                if *value > 0.0 { h } else { diagram.min_node_height }
            })
            .collect();
        let used = heights.iter().sum::<f32>()
            + members.len().saturating_sub(1) as f32 * diagram.node_gap;
        let x = content.min_x() + column as f32 * step;
        let mut y = content.min_y() + ((height - used) / 2.0).max(0.0);
        for ((node, value), h) in members.iter().zip(heights) {
            let bounds =
                Bounds::new_from_top_left(Point::new(x, y), Size::new(diagram.node_width, h));
            positions.insert(*node, bounds);
            let input = graph.node(*node);
            let index = graph.graph[*node];
            nodes.push(PositionedNode {
                id: input.id.clone(),
                column,
                bounds,
                color: input.color.unwrap_or_else(|| style.color(index)),
                value: *value,
            });
            y += h + diagram.node_gap;
        }
    }

    // Ports fill each node top-down in link input order.
    let mut source_ports: HashMap<usize, LinkPort> = HashMap::new();
    let mut target_ports: HashMap<usize, LinkPort> = HashMap::new();
    for node in graph.node_indices() {
        let Some(bounds) = positions.get(&node) else {
            continue;
        };
        for (direction, ports, x) in [
            (Direction::Outgoing, &mut source_ports, bounds.max_x()),
            (Direction::Incoming, &mut target_ports, bounds.min_x()),
        ] {
            let mut top = bounds.min_y();
            for (link, _) in graph.links_of(node, direction) {
                let h = graph.link(link).value as f32 * flow_scale;
                ports.insert(link, LinkPort::new(x, top, top + h));
                top += h;
            }
        }
    }

    let colors: HashMap<&str, Color> = nodes.iter().map(|n| (n.id.as_str(), n.color)).collect();
    let mut links: Vec<(usize, PositionedLink)> = source_ports
        .iter()
        .filter_map(|(link, source_port)| {
            let target_port = *target_ports.get(link)?;
            let input = graph.link(*link);
            let color = colors.get(input.source.as_str()).copied().unwrap_or_default();
            Some((
                *link,
                PositionedLink {
                    source: input.source.clone(),
                    target: input.target.clone(),
                    value: input.value,
                    source_port: *source_port,
                    target_port,
                    color: color.with_alpha(diagram.link_opacity),
                },
            ))
        })
        .collect();
    links.sort_unstable_by_key(|(link, _)| *link);

    debug!(columns = column_count, flow_scale; "Diagram placed");
    (
        flow_scale,
        nodes,
        links.into_iter().map(|(_, link)| link).collect(),
    )
}

fn primitives(
    ctx: &dyn RenderContext,
    graph: &FlowGraph<'_>,
    content: Bounds,
    nodes: &[PositionedNode],
    links: &[PositionedLink],
    style: &FigureStyle,
) -> Result<Vec<Primitive>, FiguraError> {
    let diagram = &style.diagram;
    let last_column = nodes.iter().map(|n| n.column).max().unwrap_or(0);
    let column_count = last_column + 1;
    let label_width =
        (content.width() / column_count as f32 - diagram.node_width - 2.0 * diagram.label_gap).max(0.0);
    let label_style = style.text_style(TextRole::Label);

    let mut out = Vec::with_capacity(nodes.len() * 2 + links.len());
    for (i, link) in links.iter().enumerate() {
        out.push(Primitive::new(
            format!("link-{i}"),
            Shape::Link(LinkShape {
                source: link.source.clone(),
                target: link.target.clone(),
                source_port: link.source_port,
                target_port: link.target_port,
                fill: link.color,
                value: link.value,
            }),
        ));
    }
    for node in nodes {
        out.push(Primitive::new(
            format!("node-{}", node.id),
            Shape::Node(NodeShape {
                id: node.id.clone(),
                bounds: node.bounds,
                fill: node.color,
                column: node.column,
                value: node.value,
            }),
        ));

        let source = graph
            .ids
            .get(node.id.as_str())
            .and_then(|index| graph.node(*index).label.clone())
            .unwrap_or_else(|| node.id.clone());
        let measured = text::measure(ctx, &RichText::parse(&source, label_style.clone()), label_width)?;
        if measured.is_empty() {
            continue;
        }
        let middle = node.bounds.min_y() + node.bounds.height() / 2.0;
        let (position, horizontal) = if node.column == last_column && last_column > 0 {
            (Point::new(node.bounds.min_x() - diagram.label_gap, middle), HAlign::Right)
        } else {
            (Point::new(node.bounds.max_x() + diagram.label_gap, middle), HAlign::Left)
        };
        out.push(Primitive::new(
            format!("node-label-{}", node.id),
            Shape::Label(LabelShape {
                text: PlacedText::new(measured, position, TextAlign::new(horizontal, VAlign::Middle)),
                index: PlotIndex::default(),
            }),
        ));
    }
    Ok(out)
}

/// Renders flow diagrams.
pub struct DiagramRenderer {
    resolver: Arc<dyn StyleResolver>,
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new(Arc::new(ScaledStyleResolver))
    }
}

impl DiagramRenderer {
    pub fn new(resolver: Arc<dyn StyleResolver>) -> Self {
        Self { resolver }
    }

    fn estimate(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &DiagramInput,
        scale: f32,
    ) -> Result<IdealHeight, FiguraError> {
        let style = figure::resolve_style(self.resolver.as_ref(), &input.base, scale);
        let diagram = &style.diagram;
        let probe = Bounds::from_size(Size::new(width, f32::MAX / 4.0));
        let surrounds = surround::layout(ctx, probe, &input.base, &[], &style)?;

        let graph = FlowGraph::new(input);
        let columns = graph.layout_columns();
        let mut per_column: HashMap<usize, usize> = HashMap::new();
        for column in columns.values() {
            *per_column.entry(*column).or_default() += 1;
        }
        let tallest = per_column.values().copied().max().unwrap_or(0) as f32;
        let column_count = per_column.keys().max().map_or(0, |c| c + 1) as f32;

        let min_content = tallest * diagram.min_node_height
            + (tallest - 1.0).max(0.0) * diagram.node_gap;
        let min_width = 2.0 * style.padding
            + column_count * diagram.node_width
            + (column_count - 1.0).max(0.0) * diagram.min_column_gap;
        Ok(IdealHeight::new(
            surrounds.height + min_content,
            surrounds.height + diagram.ideal_height.max(min_content),
            surrounds.height + diagram.max_height.max(min_content),
            width,
            min_width,
        ))
    }

    fn scale_for(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        height: f32,
        input: &DiagramInput,
        responsive_scale: Option<f32>,
    ) -> f32 {
        figure::resolve_scale(&input.base, responsive_scale, width, height, |s| {
            let ideal = self.estimate(ctx, width, input, s)?;
            Ok((width / ideal.needed_scaling_to_fit_width, ideal.ideal_h))
        })
    }
}

impl FigureRenderer for DiagramRenderer {
    type Input = DiagramInput;
    type Measured = MeasuredDiagram;

    fn is_type(&self, figure: &Figure) -> bool {
        matches!(figure, Figure::Diagram(_))
    }

    fn measure(
        &self,
        ctx: &dyn RenderContext,
        bounds: Bounds,
        input: &DiagramInput,
        responsive_scale: Option<f32>,
    ) -> Result<MeasuredDiagram, FiguraError> {
        let scale = self.scale_for(ctx, bounds.width(), bounds.height(), input, responsive_scale);
        let style = figure::resolve_style(self.resolver.as_ref(), &input.base, scale);
        let surrounds = surround::layout(ctx, bounds, &input.base, &[], &style)?;
        let content = surrounds.plot;

        let graph = FlowGraph::new(input);
        let (flow_scale, nodes, links) = place(&graph, content, &style);

        let mut out: Vec<Primitive> = figure::background(bounds, &style).into_iter().collect();
        out.extend(surrounds.primitives.iter().cloned());
        out.extend(primitives(ctx, &graph, content, &nodes, &links, &style)?);

        Ok(MeasuredDiagram {
            bounds,
            style,
            scale,
            surrounds,
            flow_scale,
            nodes,
            links,
            primitives: out,
        })
    }

    fn render(&self, ctx: &mut dyn RenderContext, measured: &MeasuredDiagram) {
        pipeline::render_primitives(ctx, &measured.primitives);
    }

    fn ideal_height(
        &self,
        ctx: &dyn RenderContext,
        width: f32,
        input: &DiagramInput,
        responsive_scale: Option<f32>,
    ) -> Result<IdealHeight, FiguraError> {
        let scale = self.scale_for(ctx, width, f32::INFINITY, input, responsive_scale);
        self.estimate(ctx, width, input, scale)
    }
}
