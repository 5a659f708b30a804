//! Structural cloning of trees: one archetype, many independent instances.

use crate::bt::{NodeId, Status};
use crate::error::{BtError, Result};
use crate::library::TreeLibrary;
use crate::node::{Node, NodeKind};
use crate::tree::Tree;

/// Library handle and the chain of eager includes currently being expanded.
struct CloneScope<'a, B> {
    library: Option<&'a TreeLibrary<B>>,
    includes: Vec<String>,
}

impl<B: 'static> Tree<B> {
    /// Fresh, independent instance of this tree running against `blackboard`.
    pub fn instantiate(&self, blackboard: B) -> Result<Tree<B>> {
        let mut tree = self.clone_archetype()?;
        tree.blackboard = Some(blackboard);
        Ok(tree)
    }

    /// Structural copy with every node `Fresh`: no blackboard, no listeners and no runtime state.
    ///
    /// Eager includes are replaced by a clone of the named library tree. Lazy includes are copied as
    /// they are, without any subtree they may have resolved.
    pub fn clone_archetype(&self) -> Result<Tree<B>> {
        self.clone_with(self.library.as_ref(), None)
    }

    /// `origin` names the library tree being cloned so that it cannot include itself eagerly.
    pub(crate) fn clone_with(
        &self,
        library: Option<&TreeLibrary<B>>,
        origin: Option<&str>,
    ) -> Result<Tree<B>> {
        let mut scope = CloneScope {
            library,
            includes: origin.into_iter().map(str::to_owned).collect(),
        };
        let mut tree = Tree::empty()
            .with_config(self.config.clone())
            .with_semaphores(self.semaphores.clone());
        tree.library = self.library.clone();
        if let Some(root) = self.root {
            let root = self.clone_node(root, None, &mut tree, &mut scope)?;
            tree.root = Some(root);
        }
        Ok(tree)
    }

    fn clone_node(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        into: &mut Tree<B>,
        scope: &mut CloneScope<'_, B>,
    ) -> Result<NodeId> {
        let node = &self.nodes[id.index()];
        let mut lazy_include = false;
        if let NodeKind::Decorator(decorator) = &node.kind {
            match decorator.included() {
                Some((subtree, false)) => return clone_include(subtree, parent, into, scope),
                Some((_, true)) => lazy_include = true,
                None => {}
            }
        }

        let copy = NodeId(into.nodes.len() as u32);
        into.nodes.push(Node {
            status: Status::Fresh,
            control: parent,
            children: Vec::new(),
            kind: node.kind.clone_fresh()?,
        });
        if lazy_include {
            return Ok(copy);
        }
        for &child in &node.children {
            let child = self.clone_node(child, Some(copy), into, scope)?;
            into.nodes[copy.index()].children.push(child);
        }
        Ok(copy)
    }
}

fn clone_include<B: 'static>(
    subtree: &str,
    parent: Option<NodeId>,
    into: &mut Tree<B>,
    scope: &mut CloneScope<'_, B>,
) -> Result<NodeId> {
    if scope.includes.iter().any(|name| name == subtree) {
        let chain = scope.includes.join(" -> ");
        return Err(BtError::IncludeCycle(format!("{chain} -> {subtree}")));
    }
    let library = scope
        .library
        .ok_or_else(|| BtError::NoLibrary(subtree.to_owned()))?;
    let archetype = library.archetype(subtree)?;
    let root = archetype.root.ok_or(BtError::MissingRoot)?;

    scope.includes.push(subtree.to_owned());
    let copy = archetype.clone_node(root, parent, into, scope)?;
    scope.includes.pop();
    Ok(copy)
}
