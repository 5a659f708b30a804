use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use ai_core::{derive_seed, Semaphores};

use crate::config::TreeConfig;
use crate::error::{BtError, Result};
use crate::tree::Tree;

const SEED_STREAM: u64 = 0xB7;

/// Named archetype trees plus the semaphores shared by every tree created from them.
///
/// Cheap to clone: clones share the same registry. Trees created by the library keep a handle to
/// it so that lazy includes can be resolved at run time.
pub struct TreeLibrary<B> {
    inner: Rc<Inner<B>>,
}

struct Inner<B> {
    trees: RefCell<BTreeMap<String, Rc<Tree<B>>>>,
    config: TreeConfig,
    semaphores: Semaphores,
    instances: Cell<u64>,
}

impl<B> Clone for TreeLibrary<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<B> fmt::Debug for TreeLibrary<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeLibrary")
            .field("trees", &self.names())
            .field("config", &self.inner.config)
            .field("instances", &self.inner.instances.get())
            .finish()
    }
}

impl<B: 'static> Default for TreeLibrary<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> TreeLibrary<B> {
    pub fn names(&self) -> Vec<String> {
        self.inner.trees.borrow().keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.trees.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.inner.trees.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.trees.borrow().is_empty()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.inner.config
    }

    pub fn semaphores(&self) -> &Semaphores {
        &self.inner.semaphores
    }

    /// Number of trees created so far.
    pub fn instances(&self) -> u64 {
        self.inner.instances.get()
    }

    pub fn same_library(&self, other: &TreeLibrary<B>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<B: 'static> TreeLibrary<B> {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                trees: RefCell::new(BTreeMap::new()),
                config,
                semaphores: Semaphores::new(),
                instances: Cell::new(0),
            }),
        }
    }

    /// Stores `tree` as the archetype `name`, returning the archetype it replaces.
    ///
    /// The archetype's blackboard, listeners and library handle are dropped.
    pub fn register(&self, name: impl Into<String>, mut tree: Tree<B>) -> Option<Rc<Tree<B>>> {
        let name = name.into();
        tree.blackboard = None;
        tree.library = None;
        tree.remove_listeners();
        tracing::debug!(tree = %name, nodes = tree.len(), "registered tree");
        self.inner.trees.borrow_mut().insert(name, Rc::new(tree))
    }

    pub fn unregister(&self, name: &str) -> Option<Rc<Tree<B>>> {
        self.inner.trees.borrow_mut().remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Rc<Tree<B>>> {
        self.inner.trees.borrow().get(name).cloned()
    }

    pub fn archetype(&self, name: &str) -> Result<Rc<Tree<B>>> {
        self.get(name)
            .ok_or_else(|| BtError::UnknownTree(name.to_owned()))
    }

    /// Clone of the archetype `name` with its eager includes expanded, without a blackboard.
    pub fn clone_archetype(&self, name: &str) -> Result<Tree<B>> {
        let archetype = self.archetype(name)?;
        let mut tree = archetype.clone_with(Some(self), Some(name))?;
        tree.library = Some(self.clone());
        tree.semaphores = self.inner.semaphores.clone();
        Ok(tree)
    }

    /// New tree instance of the archetype `name` running against `blackboard`.
    ///
    /// Every instance gets its own RNG seed, derived from the library seed and an instance
    /// counter, and shares the library's semaphores.
    pub fn create_tree(&self, name: &str, blackboard: B) -> Result<Tree<B>> {
        let tree = self.clone_archetype(name)?;
        let instance = self.inner.instances.get();
        self.inner.instances.set(instance + 1);

        let seed = derive_seed(self.inner.config.seed, instance, SEED_STREAM);
        let config = TreeConfig {
            seed,
            ..self.inner.config.clone()
        };
        let mut tree = tree.with_config(config);
        tree.blackboard = Some(blackboard);
        tracing::debug!(tree = %name, instance, seed, "created tree instance");
        Ok(tree)
    }
}
