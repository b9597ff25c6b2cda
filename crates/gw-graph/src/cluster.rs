//! k-means++ over graph distance.
//!
//! There is no mean in graph space, so each cluster's centre is redefined
//! every round as the median node of the longest path through the cluster's
//! induced subgraph. Seeding is D² sampling on path length.

use std::sync::Arc;

use gw_core::{ExecContext, NodeId};
use rand::Rng;
use tracing::{debug, warn};

use crate::connected::{ConnectedGraph, PathTree};

/// Default cap on Lloyd iterations.
pub const MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub centroid: NodeId,
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    pub iterations: usize,
    pub converged: bool,
}

impl ConnectedGraph {
    /// Group the nodes into `min(k, n)` clusters by path length.
    ///
    /// Stops when at most `n / 1024` nodes change cluster in a round, when
    /// the change counts start repeating (two nodes swapping back and forth),
    /// or after `max_iterations` rounds.
    pub fn cluster(&self, ctx: &ExecContext, k: usize, max_iterations: usize) -> Clustering {
        let nodes = self.nodes();
        let k = k.min(nodes.len());
        if k == 0 {
            return Clustering {
                clusters: Vec::new(),
                iterations: 0,
                converged: true,
            };
        }

        let mut centroids = self.seed_centroids(ctx, k);
        let mut assignment = self.assign(ctx, &centroids, &vec![0; nodes.len()]);

        let threshold = nodes.len() >> 10;
        let mut history: Vec<isize> = vec![-3, -2, -1];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < max_iterations {
            iterations += 1;
            self.recenter(&mut centroids, &assignment);

            let next = self.assign(ctx, &centroids, &assignment);
            let changed = next
                .iter()
                .zip(&assignment)
                .filter(|(a, b)| a != b)
                .count();
            assignment = next;
            history.push(changed as isize);
            debug!(iteration = iterations, changed, "reassigned nodes");

            if changed <= threshold {
                converged = true;
                break;
            }
            let h = history.len();
            if h > 4 && history[h - 4..h - 2] == history[h - 2..] {
                warn!(iterations, "clustering failed to converge, change counts repeat");
                break;
            }
        }

        let mut clusters: Vec<Cluster> = centroids
            .iter()
            .map(|&centroid| Cluster {
                centroid,
                members: Vec::new(),
            })
            .collect();
        for (&n, &c) in nodes.iter().zip(&assignment) {
            clusters[c].members.push(n);
        }

        Clustering {
            clusters,
            iterations,
            converged,
        }
    }

    /// D² seeding: first centre uniformly at random, each further centre with
    /// probability proportional to the squared distance to its nearest centre.
    fn seed_centroids(&self, ctx: &ExecContext, k: usize) -> Vec<NodeId> {
        let nodes = self.nodes();
        let mut rng = ctx.rng();
        let mut centroids = vec![nodes[rng.gen_range(0..nodes.len())]];

        while centroids.len() < k {
            let trees = self.trees_for(&centroids);
            let weights: Vec<f64> = ctx.par_map(nodes, |&n| {
                trees
                    .iter()
                    .filter_map(|t| t.length_to(n))
                    .min_by(f64::total_cmp)
                    .map_or(0.0, |d| d * d)
            });
            let sum: f64 = weights.iter().sum();

            let pick = if sum > 0.0 {
                let target = rng.gen_range(0.0..sum);
                let mut acc = 0.0;
                let mut pick = None;
                for (i, w) in weights.iter().enumerate() {
                    if *w <= 0.0 {
                        continue;
                    }
                    acc += w;
                    pick = Some(nodes[i]);
                    if acc > target {
                        break;
                    }
                }
                pick
            } else {
                None
            };
            let pick = pick.or_else(|| nodes.iter().copied().find(|n| !centroids.contains(n)));
            match pick {
                Some(n) => centroids.push(n),
                None => break,
            }
        }
        centroids
    }

    fn trees_for(&self, centroids: &[NodeId]) -> Vec<Arc<PathTree>> {
        self.prewarm(centroids);
        centroids.iter().filter_map(|&c| self.tree(c)).collect()
    }

    /// Nearest centre per node, as an index into `centroids`. Ties go to the
    /// earlier centre; a node no centre reaches keeps its current cluster.
    fn assign(&self, ctx: &ExecContext, centroids: &[NodeId], current: &[usize]) -> Vec<usize> {
        let trees = self.trees_for(centroids);
        let work: Vec<(NodeId, usize)> = self
            .nodes()
            .iter()
            .copied()
            .zip(current.iter().copied())
            .collect();
        ctx.par_map(&work, |&(n, cur)| {
            let mut best = cur;
            let mut best_d = f64::INFINITY;
            for (ci, t) in trees.iter().enumerate() {
                if let Some(d) = t.length_to(n) {
                    if d < best_d {
                        best = ci;
                        best_d = d;
                    }
                }
            }
            best
        })
    }

    /// Move each centre to the median of its cluster's longest path. Empty
    /// clusters keep their centre.
    fn recenter(&self, centroids: &mut [NodeId], assignment: &[usize]) {
        let nodes = self.nodes();
        for (ci, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<NodeId> = nodes
                .iter()
                .zip(assignment)
                .filter(|(_, a)| **a == ci)
                .map(|(n, _)| *n)
                .collect();
            let Some(&first) = members.first() else {
                continue;
            };
            let cg = ConnectedGraph::from_graph(self.graph().subgraph(&members));
            let lp = cg.longest_path();
            *centroid = if lp.is_empty() { first } else { lp.median() };
        }
    }
}
