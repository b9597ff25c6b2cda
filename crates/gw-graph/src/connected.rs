//! Connected views: cached paths, distances and neighbourhood growth.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use gw_core::{EdgeId, NodeId};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::network::Network;
use crate::path::Path;

/// How a step along an edge is counted when measuring distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMetric {
    /// Sum of line lengths.
    Length,
    /// One unit per edge.
    Hops,
}

/// Breadth-first tree rooted at one source: the route to every reachable
/// node plus its length and hop count.
#[derive(Debug, Clone)]
pub struct PathTree {
    source: NodeId,
    order: Vec<NodeId>,
    parent: HashMap<NodeId, (NodeId, EdgeId)>,
    length: HashMap<NodeId, f64>,
    hops: HashMap<NodeId, usize>,
}

impl PathTree {
    fn build(graph: &Graph, source: NodeId) -> Self {
        let mut tree = Self {
            source,
            order: vec![source],
            parent: HashMap::new(),
            length: HashMap::from([(source, 0.0)]),
            hops: HashMap::from([(source, 0)]),
        };
        graph.traverse(source, |edge, from, to| {
            let step = graph.edge_info(edge).map_or(0.0, |e| e.length);
            let length = tree.length[&from] + step;
            let hops = tree.hops[&from] + 1;
            tree.parent.insert(to, (from, edge));
            tree.length.insert(to, length);
            tree.hops.insert(to, hops);
            tree.order.push(to);
        });
        tree
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn reaches(&self, node: NodeId) -> bool {
        self.length.contains_key(&node)
    }

    /// Reachable nodes in discovery order, source first.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn length_to(&self, node: NodeId) -> Option<f64> {
        self.length.get(&node).copied()
    }

    pub fn hops_to(&self, node: NodeId) -> Option<usize> {
        self.hops.get(&node).copied()
    }

    pub fn distance_to(&self, node: NodeId, metric: EdgeMetric) -> Option<f64> {
        match metric {
            EdgeMetric::Length => self.length_to(node),
            EdgeMetric::Hops => self.hops_to(node).map(|h| h as f64),
        }
    }

    /// Edges from the source to `node`, in walking order.
    pub fn route_to(&self, node: NodeId) -> Option<Vec<EdgeId>> {
        if !self.reaches(node) {
            return None;
        }
        let mut route = Vec::with_capacity(self.hops[&node]);
        let mut cur = node;
        while let Some(&(prev, edge)) = self.parent.get(&cur) {
            route.push(edge);
            cur = prev;
        }
        route.reverse();
        Some(route)
    }

    /// The farthest reachable node. Ties go to the node discovered first.
    pub fn farthest(&self, metric: EdgeMetric) -> (NodeId, f64) {
        let mut best = (self.source, 0.0);
        for &n in &self.order {
            let d = self.distance_to(n, metric).unwrap_or(0.0);
            if d > best.1 {
                best = (n, d);
            }
        }
        best
    }
}

/// A graph view whose nodes are assumed mutually reachable.
///
/// Paths are breadth-first (fewest edges); their lengths are the summed line
/// lengths along that route. Trees are cached per source until the next
/// [`ConnectedGraph::reset`] or [`ConnectedGraph::invalidate_cache`].
#[derive(Debug)]
pub struct ConnectedGraph {
    graph: Graph,
    trees: RwLock<HashMap<NodeId, Arc<PathTree>>>,
}

impl Clone for ConnectedGraph {
    fn clone(&self) -> Self {
        Self::from_graph(self.graph.clone())
    }
}

impl ConnectedGraph {
    pub fn new(network: &Network, nodes: impl IntoIterator<Item = NodeId>) -> GraphResult<Self> {
        let graph = Graph::new(network, nodes)?;
        if graph.is_empty() {
            return Err(GraphError::EmptyNodeSet);
        }
        Ok(Self::from_graph(graph))
    }

    pub(crate) fn from_graph(graph: Graph) -> Self {
        Self {
            graph,
            trees: RwLock::new(HashMap::new()),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &[NodeId] {
        self.graph.nodes()
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.graph.contains(node)
    }

    pub fn is_stale(&self, network: &Network) -> bool {
        self.graph.is_stale(network)
    }

    /// Drop every cached path tree.
    pub fn invalidate_cache(&self) {
        self.trees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Rebuild adjacency from the network and drop cached paths.
    pub fn reset(&mut self, network: &Network) {
        self.graph.reset(network);
        self.invalidate_cache();
    }

    /// Cached BFS tree rooted at `source`.
    pub fn tree(&self, source: NodeId) -> Option<Arc<PathTree>> {
        if !self.contains(source) {
            return None;
        }
        if let Some(t) = self
            .trees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&source)
        {
            return Some(Arc::clone(t));
        }
        let tree = Arc::new(PathTree::build(&self.graph, source));
        self.trees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(source)
            .or_insert_with(|| Arc::clone(&tree));
        Some(tree)
    }

    /// Build trees for `sources` up front so later readers only take the
    /// read lock.
    pub fn prewarm(&self, sources: &[NodeId]) {
        for &s in sources {
            self.tree(s);
        }
    }

    /// Edge sequence from `from` to `to`; empty when they coincide.
    pub fn path(&self, from: NodeId, to: NodeId) -> Option<Vec<EdgeId>> {
        if from == to {
            return self.contains(from).then(Vec::new);
        }
        self.tree(from)?.route_to(to)
    }

    /// Like [`path`](Self::path) but with the node sequence resolved.
    pub fn path_between(&self, from: NodeId, to: NodeId) -> Option<Path> {
        let route = self.path(from, to)?;
        Path::from_edges(&self.graph, from, &route).ok()
    }

    /// Summed length along [`path`](Self::path).
    pub fn manhattan_distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.tree(from)?.length_to(to)
    }

    pub fn hop_distance(&self, from: NodeId, to: NodeId) -> Option<usize> {
        self.tree(from)?.hops_to(to)
    }

    pub fn farthest_node_from(&self, source: NodeId, metric: EdgeMetric) -> Option<(NodeId, f64)> {
        Some(self.tree(source)?.farthest(metric))
    }

    fn walk(&self, tree: &PathTree, to: NodeId) -> Path {
        tree.route_to(to)
            .and_then(|r| Path::from_edges(&self.graph, tree.source(), &r).ok())
            .unwrap_or_else(|| Path::trivial(tree.source()))
    }

    /// Longest of the BFS-tree paths.
    ///
    /// On a forest this is the double sweep: farthest node from the first
    /// node, then farthest from that. Once lines close a cycle the sweep is no
    /// longer exact, so every node is tried as a source instead.
    pub fn longest_path(&self) -> Path {
        let first = self.graph.nodes()[0];
        if self.graph.is_acyclic() {
            let Some((end, _)) = self.farthest_node_from(first, EdgeMetric::Length) else {
                return Path::trivial(first);
            };
            let Some(tree) = self.tree(end) else {
                return Path::trivial(first);
            };
            let (start, _) = tree.farthest(EdgeMetric::Length);
            return match self.tree(start) {
                Some(t) => self.walk(&t, end),
                None => Path::trivial(first),
            };
        }

        debug!(nodes = self.len(), "cyclic graph, exhaustive longest path");
        let mut best: Option<(PathTree, NodeId, f64)> = None;
        for &s in self.graph.nodes() {
            let tree = PathTree::build(&self.graph, s);
            let (far, d) = tree.farthest(EdgeMetric::Length);
            if best.as_ref().is_none_or(|(_, _, bd)| d > *bd) {
                best = Some((tree, far, d));
            }
        }
        match best {
            Some((tree, far, _)) => self.walk(&tree, far),
            None => Path::trivial(first),
        }
    }

    /// Path from `source` to the node farthest from it by length.
    pub fn longest_path_from(&self, source: NodeId) -> Option<Path> {
        let tree = self.tree(source)?;
        let (far, _) = tree.farthest(EdgeMetric::Length);
        Some(self.walk(&tree, far))
    }

    /// Median of the longest path, or the first node when there are no edges.
    pub fn median_node(&self) -> NodeId {
        let lp = self.longest_path();
        if lp.is_empty() {
            self.graph.nodes()[0]
        } else {
            lp.median()
        }
    }

    pub fn total_edge_length(&self) -> f64 {
        self.graph.total_edge_length()
    }

    pub fn is_acyclic(&self) -> bool {
        self.graph.is_acyclic()
    }

    pub fn demand(&self, network: &Network) -> f64 {
        self.nodes()
            .iter()
            .filter_map(|n| network.node(*n))
            .map(|n| n.load())
            .sum()
    }

    /// Grow by `steps` hops over the whole network's attached edges.
    pub fn expand(&self, network: &Network, steps: usize) -> GraphResult<ConnectedGraph> {
        let mut handful: Vec<NodeId> = self.nodes().to_vec();
        let mut seen: HashSet<NodeId> = handful.iter().copied().collect();
        let mut frontier = handful.clone();
        for _ in 0..steps {
            let mut next = Vec::new();
            for &n in &frontier {
                for (other, _) in network.neighbors(n) {
                    if seen.insert(other) {
                        next.push(other);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            handful.extend_from_slice(&next);
            frontier = next;
        }
        ConnectedGraph::new(network, handful)
    }

    /// Members with at least one attached edge leaving the view.
    pub fn border_nodes(&self, network: &Network) -> Vec<NodeId> {
        self.nodes()
            .iter()
            .copied()
            .filter(|&n| network.neighbors(n).any(|(o, _)| !self.contains(o)))
            .collect()
    }

    /// Non-members one edge away, in first-seen order.
    pub fn nodes_just_beyond(&self, network: &Network) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &n in self.nodes() {
            for (o, _) in network.neighbors(n) {
                if !self.contains(o) && seen.insert(o) {
                    out.push(o);
                }
            }
        }
        out
    }

    /// Does `other` contain a node one edge outside this view?
    pub fn touching(&self, network: &Network, other: &ConnectedGraph) -> bool {
        self.nodes_just_beyond(network)
            .into_iter()
            .any(|n| other.contains(n))
    }

    /// Distance from `node` to the nearest border node of `group`, measured
    /// along this graph. Zero when the group already holds the node.
    pub fn manhattan_distance_from_group(
        &self,
        network: &Network,
        node: NodeId,
        group: &ConnectedGraph,
    ) -> Option<f64> {
        if group.contains(node) {
            return Some(0.0);
        }
        let tree = self.tree(node)?;
        group
            .border_nodes(network)
            .into_iter()
            .filter_map(|b| tree.length_to(b))
            .min_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NetworkBuilder;

    /// a-b-c-d-e in a line with lengths 1,2,3,4, plus f hanging off c.
    fn tree_net() -> (Network, Vec<NodeId>) {
        let mut b = NetworkBuilder::new();
        let n: Vec<NodeId> = (0..6).map(|i| b.add_node(i as f64, 0.0, 1.0)).collect();
        b.add_line(n[0], n[1], 1.0);
        b.add_line(n[1], n[2], 2.0);
        b.add_line(n[2], n[3], 3.0);
        b.add_line(n[3], n[4], 4.0);
        b.add_line(n[2], n[5], 1.0);
        (b.build().unwrap(), n)
    }

    #[test]
    fn empty_set_is_rejected() {
        let (net, _) = tree_net();
        assert!(matches!(
            ConnectedGraph::new(&net, Vec::new()),
            Err(GraphError::EmptyNodeSet)
        ));
    }

    #[test]
    fn paths_and_distances() {
        let (net, n) = tree_net();
        let cg = ConnectedGraph::new(&net, n.clone()).unwrap();
        assert_eq!(cg.path(n[0], n[0]), Some(vec![]));
        assert_eq!(cg.path(n[0], n[4]).map(|p| p.len()), Some(4));
        assert_eq!(cg.manhattan_distance(n[0], n[4]), Some(10.0));
        assert_eq!(cg.hop_distance(n[5], n[4]), Some(3));
        // cached tree answers the same
        assert_eq!(cg.manhattan_distance(n[0], n[5]), Some(4.0));
    }

    #[test]
    fn farthest_by_metric() {
        let (net, n) = tree_net();
        let cg = ConnectedGraph::new(&net, n.clone()).unwrap();
        assert_eq!(cg.farthest_node_from(n[2], EdgeMetric::Length), Some((n[4], 7.0)));
        // n[0] and n[4] are both two hops away; n[0] is discovered first
        let (far, hops) = cg.farthest_node_from(n[2], EdgeMetric::Hops).unwrap();
        assert_eq!(hops, 2.0);
        assert_eq!(far, n[0]);
    }

    #[test]
    fn longest_path_and_median() {
        let (net, n) = tree_net();
        let cg = ConnectedGraph::new(&net, n.clone()).unwrap();
        let lp = cg.longest_path();
        assert!((lp.length() - 10.0).abs() < 1e-12);
        let mut ends = [lp.start(), lp.end()];
        ends.sort();
        assert_eq!(ends, [n[0], n[4]]);
        // mark at 5 along a(0) b(1) c(3) d(6) e(10): crossing c-d, d is nearer
        assert_eq!(cg.median_node(), n[3]);

        let from_f = cg.longest_path_from(n[5]).unwrap();
        assert_eq!((from_f.start(), from_f.end()), (n[5], n[4]));
        assert_eq!(from_f.length(), 8.0);
        assert_eq!(cg.demand(&net), 6.0);
    }

    #[test]
    fn longest_path_on_cycle() {
        let (mut net, n) = tree_net();
        let e = net.add_edge(n[4], n[5], 1.0).unwrap();
        net.attach(e).unwrap();
        let cg = ConnectedGraph::new(&net, n.clone()).unwrap();
        assert!(!cg.is_acyclic());
        let lp = cg.longest_path();
        assert!(lp.length() > 0.0);
        for w in lp.nodes().windows(2) {
            assert!(net.has_edge_between(w[0], w[1]));
        }
    }

    #[test]
    fn single_node_graph() {
        let (net, n) = tree_net();
        let cg = ConnectedGraph::new(&net, [n[3]]).unwrap();
        assert_eq!(cg.median_node(), n[3]);
        assert!(cg.longest_path().is_empty());
    }

    #[test]
    fn borders_and_expansion() {
        let (net, n) = tree_net();
        let cg = ConnectedGraph::new(&net, [n[1], n[2]]).unwrap();
        assert_eq!(cg.border_nodes(&net), vec![n[1], n[2]]);
        assert_eq!(cg.nodes_just_beyond(&net), vec![n[0], n[3], n[5]]);

        let grown = cg.expand(&net, 1).unwrap();
        assert_eq!(grown.len(), 5);
        let all = cg.expand(&net, 10).unwrap();
        assert_eq!(all.len(), 6);

        let tail = ConnectedGraph::new(&net, [n[4]]).unwrap();
        assert!(!cg.touching(&net, &tail));
        let d = ConnectedGraph::new(&net, [n[3]]).unwrap();
        assert!(cg.touching(&net, &d));
    }

    #[test]
    fn distance_from_group() {
        let (net, n) = tree_net();
        let whole = ConnectedGraph::new(&net, n.clone()).unwrap();
        let group = ConnectedGraph::new(&net, [n[3], n[4]]).unwrap();
        assert_eq!(whole.manhattan_distance_from_group(&net, n[4], &group), Some(0.0));
        assert_eq!(whole.manhattan_distance_from_group(&net, n[0], &group), Some(6.0));
    }

    #[test]
    fn reset_drops_cached_paths() {
        let (mut net, n) = tree_net();
        let mut cg = ConnectedGraph::new(&net, n.clone()).unwrap();
        assert_eq!(cg.hop_distance(n[0], n[4]), Some(4));
        let e = net.add_edge(n[0], n[4], 20.0).unwrap();
        net.attach(e).unwrap();
        assert!(cg.is_stale(&net));
        cg.reset(&net);
        assert_eq!(cg.hop_distance(n[0], n[4]), Some(1));
    }
}
