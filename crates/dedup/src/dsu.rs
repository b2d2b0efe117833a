//! Disjoint-set union over record indices `0..n`.
//!
//! Build once, query at the end: there is no split or removal.

use std::collections::BTreeMap;

use crate::model::Cluster;

#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl DisjointSet {
    /// `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            sets: n,
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root of `x`'s set, halving the path on the way up.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets of `a` and `b`. Returns `false` if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        self.sets -= 1;
        true
    }

    /// Number of disjoint sets.
    pub fn set_count(&self) -> usize {
        self.sets
    }

    /// All sets as clusters, ordered by their smallest member.
    pub fn clusters(&mut self) -> Vec<Cluster> {
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            by_root.entry(root).or_default().push(i);
        }

        // Members are pushed in ascending order, so each list is already sorted.
        let mut clusters: Vec<Cluster> = by_root
            .into_values()
            .map(|members| Cluster { members })
            .collect();
        clusters.sort_by_key(|c| c.members[0]);
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons() {
        let mut dsu = DisjointSet::new(3);
        assert_eq!(dsu.set_count(), 3);
        assert_ne!(dsu.find(0), dsu.find(1));
        let clusters = dsu.clusters();
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[2].members, vec![2]);
    }

    #[test]
    fn union_is_transitive_and_idempotent() {
        let mut dsu = DisjointSet::new(5);
        assert!(dsu.union(0, 3));
        assert!(dsu.union(3, 4));
        assert!(!dsu.union(4, 0));
        assert!(!dsu.union(0, 0));
        assert_eq!(dsu.find(0), dsu.find(4));
        assert_ne!(dsu.find(1), dsu.find(4));
        assert_eq!(dsu.set_count(), 3);
    }

    #[test]
    fn clusters_ordered_by_min_member() {
        let mut dsu = DisjointSet::new(6);
        dsu.union(5, 1);
        dsu.union(4, 2);
        dsu.union(2, 0);
        let clusters = dsu.clusters();
        let members: Vec<Vec<usize>> = clusters.into_iter().map(|c| c.members).collect();
        assert_eq!(members, vec![vec![0, 2, 4], vec![1, 5], vec![3]]);
    }

    #[test]
    fn union_order_does_not_matter() {
        let edges = [(0, 1), (2, 3), (1, 2), (5, 6)];
        let mut forward = DisjointSet::new(7);
        let mut backward = DisjointSet::new(7);
        for &(a, b) in &edges {
            forward.union(a, b);
        }
        for &(a, b) in edges.iter().rev() {
            backward.union(b, a);
        }
        assert_eq!(forward.clusters(), backward.clusters());
    }

    #[test]
    fn empty() {
        let mut dsu = DisjointSet::new(0);
        assert!(dsu.is_empty());
        assert!(dsu.clusters().is_empty());
    }
}
