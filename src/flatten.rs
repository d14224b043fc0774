//! Expansion of nested groups into the leaf drawables they contain.
//!
//! Traversal uses an explicit stack, so nesting depth is bounded only by memory.
//! Children are pushed in reverse, which yields leaves in document order
//! (depth-first, pre-order). Group nodes themselves are never emitted.

use crate::types::{Drawable, Leaf, LeafMut};

/// Flatten `nodes` into their terminal shapes and lines, in document order
pub fn flatten<'a>(nodes: impl IntoIterator<Item = &'a Drawable>) -> Vec<Leaf<'a>> {
    let mut stack: Vec<&'a Drawable> = nodes.into_iter().collect();
    stack.reverse();

    let mut leaves = Vec::new();
    while let Some(node) = stack.pop() {
        match node {
            Drawable::Shape(s) => leaves.push(Leaf::Shape(s)),
            Drawable::Line(l) => leaves.push(Leaf::Line(l)),
            Drawable::Group(g) => stack.extend(g.children.iter().rev()),
        }
    }
    leaves
}

/// Mutable counterpart of [`flatten`]
pub fn flatten_mut<'a>(nodes: impl IntoIterator<Item = &'a mut Drawable>) -> Vec<LeafMut<'a>> {
    let mut stack: Vec<&'a mut Drawable> = nodes.into_iter().collect();
    stack.reverse();

    let mut leaves = Vec::new();
    while let Some(node) = stack.pop() {
        match node {
            Drawable::Shape(s) => leaves.push(LeafMut::Shape(s)),
            Drawable::Line(l) => leaves.push(LeafMut::Line(l)),
            Drawable::Group(g) => stack.extend(g.children.iter_mut().rev()),
        }
    }
    leaves
}
