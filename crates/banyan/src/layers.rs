use crate::tree::{NodeIdx, Tree};

/// Tree nodes bucketed by depth. Buckets are dense from depth 0 (the root alone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerIndex {
    layers: Vec<Vec<NodeIdx>>,
}

impl LayerIndex {
    /// Buckets every node by its distance from the root and records that depth on the node.
    ///
    /// Within a layer, nodes appear in pre-order, so siblings keep input order and cousins
    /// follow their parents' order.
    pub fn build(tree: &mut Tree) -> Self {
        let mut layers: Vec<Vec<NodeIdx>> = Vec::new();
        let mut stack: Vec<(NodeIdx, usize)> = vec![(tree.root(), 0)];
        while let Some((v, depth)) = stack.pop() {
            if layers.len() <= depth {
                layers.push(Vec::new());
            }
            layers[depth].push(v);
            tree.set_depth(v, depth);
            stack.extend(
                tree.node(v)
                    .children()
                    .iter()
                    .rev()
                    .map(|&c| (c, depth + 1)),
            );
        }
        Self { layers }
    }

    pub fn depth_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, depth: usize) -> &[NodeIdx] {
        self.layers.get(depth).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[NodeIdx])> {
        self.layers.iter().enumerate().map(|(d, l)| (d, l.as_slice()))
    }

    /// All nodes, shallowest layer first.
    pub fn nodes_in_order(&self) -> Vec<NodeIdx> {
        self.layers.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Record;

    #[test]
    fn root_only_tree_has_one_layer() {
        let mut t = Tree::from_records(&[Record::root("r")]).unwrap();
        let layers = LayerIndex::build(&mut t);
        assert_eq!(layers.depth_count(), 1);
        assert_eq!(layers.layer(0), &[t.root()]);
        assert!(layers.layer(1).is_empty());
    }

    #[test]
    fn cousins_follow_parent_order() {
        let mut t = Tree::from_records(&[
            Record::root("r"),
            Record::child("a", "r"),
            Record::child("b", "r"),
            Record::child("b1", "b"),
            Record::child("a1", "a"),
        ])
        .unwrap();
        let layers = LayerIndex::build(&mut t);
        let names: Vec<String> = layers
            .layer(2)
            .iter()
            .map(|&i| t.node(i).id().to_string())
            .collect();
        assert_eq!(names, ["a1", "b1"]);
        assert_eq!(t.node(t.get(&"b1".into()).unwrap()).depth(), 2);
    }
}
