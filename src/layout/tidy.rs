//! Tidy-tree placement (Buchheim, Jünger & Leipert's linear-time Walker).
//!
//! Works on an index arena in pre-order (`children[i]` lists the children of
//! node `i`, node 0 is the root) and produces one x coordinate per node in
//! separation units. Siblings are 1 unit apart, cousins 2; the root lands on
//! x = 0. Both walks are iterative so deep trees cannot overflow the stack.

/// Per-node walker state. Field names follow the paper's notation.
#[derive(Debug, Clone)]
struct WalkNode {
    parent: usize,
    /// Index among siblings.
    number: usize,
    /// Default ancestor, tracked on parents while their children are walked.
    default_ancestor: Option<usize>,
    ancestor: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
}

struct Walker<'a> {
    children: &'a [Vec<usize>],
    nodes: Vec<WalkNode>,
    /// Synthetic parent of the root, stored at index `children.len()`.
    virtual_root: usize,
}

/// Compute x positions for the pre-order arena `children` (node 0 is the root).
///
/// Returns one value per node; the root is at 0.
pub(crate) fn tidy_x(children: &[Vec<usize>]) -> Vec<f64> {
    if children.is_empty() {
        return Vec::new();
    }

    let mut walker = Walker::new(children);
    for v in walker.post_order() {
        walker.first_walk(v);
    }

    let root_prelim = walker.nodes[0].prelim;
    let virtual_root = walker.virtual_root;
    walker.nodes[virtual_root].modifier = -root_prelim;

    // Pre-order arena: parents are always visited before their children
    let mut x = vec![0.0; children.len()];
    for (v, slot) in x.iter_mut().enumerate() {
        let parent_modifier = walker.nodes[walker.nodes[v].parent].modifier;
        *slot = walker.nodes[v].prelim + parent_modifier;
        walker.nodes[v].modifier += parent_modifier;
    }
    x
}

impl<'a> Walker<'a> {
    fn new(children: &'a [Vec<usize>]) -> Self {
        let virtual_root = children.len();
        let mut nodes: Vec<WalkNode> = (0..=virtual_root)
            .map(|index| WalkNode {
                parent: virtual_root,
                number: 0,
                default_ancestor: None,
                ancestor: index,
                prelim: 0.0,
                modifier: 0.0,
                change: 0.0,
                shift: 0.0,
                thread: None,
            })
            .collect();
        for (parent, kids) in children.iter().enumerate() {
            for (number, &child) in kids.iter().enumerate() {
                nodes[child].parent = parent;
                nodes[child].number = number;
            }
        }
        Self {
            children,
            nodes,
            virtual_root,
        }
    }

    fn children_of(&self, v: usize) -> &[usize] {
        if v == self.virtual_root {
            // The virtual root's only child is the real root
            &[0]
        } else {
            self.children.get(v).map(Vec::as_slice).unwrap_or(&[])
        }
    }

    /// Children before parents, left subtrees before right siblings.
    fn post_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.children.len());
        let mut stack = vec![(0usize, false)];
        while let Some((v, expanded)) = stack.pop() {
            if expanded {
                order.push(v);
            } else {
                stack.push((v, true));
                for &child in self.children_of(v).iter().rev() {
                    stack.push((child, false));
                }
            }
        }
        order
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent {
            1.0
        } else {
            2.0
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        match self.children_of(v).first() {
            Some(&child) => Some(child),
            None => self.nodes[v].thread,
        }
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        match self.children_of(v).last() {
            Some(&child) => Some(child),
            None => self.nodes[v].thread,
        }
    }

    fn first_walk(&mut self, v: usize) {
        let parent = self.nodes[v].parent;
        let number = self.nodes[v].number;
        let siblings = self.children_of(parent);
        let first_sibling = siblings[0];
        let left_sibling = (number > 0).then(|| siblings[number - 1]);

        let kids = self.children_of(v);
        let outer_children = kids.first().copied().zip(kids.last().copied());
        if let Some((first, last)) = outer_children {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                    self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
                }
                None => self.nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        let ancestor = self.nodes[parent].default_ancestor.unwrap_or(first_sibling);
        let ancestor = self.apportion(v, left_sibling, ancestor);
        self.nodes[parent].default_ancestor = Some(ancestor);
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let kids = self.children_of(v).to_vec();
        for &w in kids.iter().rev() {
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };

        let mut vop = v;
        let mut vom = self.children_of(self.nodes[v].parent)[0];
        let mut sip = self.nodes[v].modifier;
        let mut sop = self.nodes[v].modifier;
        let mut sim = self.nodes[w].modifier;
        let mut som = self.nodes[vom].modifier;

        let mut inner_left = self.next_right(w);
        let mut inner_right = self.next_left(v);
        while let (Some(vim), Some(vip)) = (inner_left, inner_right) {
            let (Some(next_vom), Some(next_vop)) = (self.next_left(vom), self.next_right(vop))
            else {
                break;
            };
            vom = next_vom;
            vop = next_vop;
            self.nodes[vop].ancestor = v;

            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }

            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;

            inner_left = self.next_right(vim);
            inner_right = self.next_left(vip);
        }

        if let Some(vim) = inner_left {
            if self.next_right(vop).is_none() {
                self.nodes[vop].thread = Some(vim);
                self.nodes[vop].modifier += sim - sop;
            }
        }
        if let Some(vip) = inner_right {
            if self.next_left(vom).is_none() {
                self.nodes[vom].thread = Some(vip);
                self.nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = self.nodes[wp].number.abs_diff(self.nodes[wm].number).max(1) as f64;
        let change = shift / subtrees;
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_node_sits_at_origin() {
        assert_eq!(tidy_x(&[vec![]]), vec![0.0]);
    }

    #[test]
    fn empty_arena_yields_nothing() {
        assert!(tidy_x(&[]).is_empty());
    }

    #[test]
    fn two_leaves_are_centered_under_parent() {
        let x = tidy_x(&[vec![1, 2], vec![], vec![]]);
        assert_eq!(x, vec![0.0, -0.5, 0.5]);
    }

    #[test]
    fn cousins_are_two_units_apart() {
        // 0 -> (1 -> 3, 2 -> 4)
        let x = tidy_x(&[vec![1, 2], vec![3], vec![4], vec![], vec![]]);
        assert_eq!(x[4] - x[3], 2.0);
        assert_eq!(x[0], 0.0);
    }

    #[test]
    fn wide_left_subtree_pushes_right_sibling() {
        // 0 -> (1 -> (3, 4, 5), 2)
        let x = tidy_x(&[vec![1, 2], vec![3, 4, 5], vec![], vec![], vec![], vec![]]);
        assert_eq!(x[4], x[1]);
        assert_eq!(x[5] - x[3], 2.0);
        assert!(x[2] - x[1] >= 1.0);
        assert_eq!(x[0], 0.0);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let depth = 100_000;
        let children: Vec<Vec<usize>> = (0..depth)
            .map(|i| if i + 1 < depth { vec![i + 1] } else { vec![] })
            .collect();
        let x = tidy_x(&children);
        assert!(x.iter().all(|&value| value == 0.0));
    }
}
