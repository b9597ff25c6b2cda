//! Disjoint-set forest with weighted union and path compression.

use std::collections::HashMap;
use std::hash::Hash;

/// Tracks which elements share a group.
///
/// Built fresh for each query or MST build; never kept across structural
/// changes to the network.
#[derive(Debug, Clone)]
pub struct UnionFind<T: Copy + Eq + Hash> {
    parent: HashMap<T, T>,
    size: HashMap<T, usize>,
    order: Vec<T>,
}

impl<T: Copy + Eq + Hash> Default for UnionFind<T> {
    fn default() -> Self {
        Self {
            parent: HashMap::new(),
            size: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> UnionFind<T> {
    pub fn new<I: IntoIterator<Item = T>>(elements: I) -> Self {
        let mut uf = Self::default();
        for e in elements {
            uf.insert(e);
        }
        uf
    }

    /// Add a singleton set. Re-inserting an element is a no-op.
    pub fn insert(&mut self, e: T) {
        if !self.parent.contains_key(&e) {
            self.parent.insert(e, e);
            self.size.insert(e, 1);
            self.order.push(e);
        }
    }

    pub fn contains(&self, e: T) -> bool {
        self.parent.contains_key(&e)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Root of `e`'s set, compressing the path on the way back.
    pub fn find(&mut self, e: T) -> Option<T> {
        let p = *self.parent.get(&e)?;
        if p == e {
            return Some(e);
        }
        let root = self.find(p)?;
        self.parent.insert(e, root);
        Some(root)
    }

    /// Root of `e`'s set without mutating; safe to call from worker threads.
    pub fn root(&self, e: T) -> Option<T> {
        let mut cur = e;
        loop {
            let p = *self.parent.get(&cur)?;
            if p == cur {
                return Some(cur);
            }
            cur = p;
        }
    }

    /// Merge the sets of `a` and `b`. Returns whether a merge happened.
    ///
    /// The smaller set joins the larger; on equal size `b`'s root goes under
    /// `a`'s. Unknown elements are ignored.
    pub fn union(&mut self, a: T, b: T) -> bool {
        let (Some(ra), Some(rb)) = (self.find(a), self.find(b)) else {
            return false;
        };
        if ra == rb {
            return false;
        }
        let sa = self.size[&ra];
        let sb = self.size[&rb];
        let (big, small) = if sa >= sb { (ra, rb) } else { (rb, ra) };
        self.parent.insert(small, big);
        self.size.insert(big, sa + sb);
        true
    }

    pub fn connected(&mut self, a: T, b: T) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    /// Non-mutating `connected`.
    pub fn same_set(&self, a: T, b: T) -> bool {
        match (self.root(a), self.root(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }

    pub fn set_size(&mut self, e: T) -> usize {
        self.find(e).map_or(0, |r| self.size[&r])
    }

    /// Every element grouped by root. Groups and their members appear in
    /// insertion order of their first element.
    pub fn disjoint_sets(&mut self) -> Vec<Vec<T>> {
        let mut slot: HashMap<T, usize> = HashMap::new();
        let mut groups: Vec<Vec<T>> = Vec::new();
        for i in 0..self.order.len() {
            let e = self.order[i];
            let Some(r) = self.find(e) else { continue };
            let idx = *slot.entry(r).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[idx].push(e);
        }
        groups
    }
}
