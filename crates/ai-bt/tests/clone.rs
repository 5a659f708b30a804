use std::cell::RefCell;
use std::rc::Rc;

use ai_bt::{
    BtError, BtStatus, NodeDef, NodeId, Result, Status, StatusUpdate, Task, Tree, TreeListener,
    TreeLibrary,
};

#[derive(Debug, Default)]
struct Board {
    visits: Vec<&'static str>,
}

fn visit(label: &'static str) -> NodeDef<Board> {
    NodeDef::action(label, move |bb: &mut Board| {
        bb.visits.push(label);
        BtStatus::Success
    })
}

fn labels(tree: &Tree<Board>) -> Vec<String> {
    tree.ids()
        .map(|id| tree.node(id).unwrap().label.to_owned())
        .collect()
}

/// Leaf bound to a resource that cannot be duplicated.
struct Unique;

impl Task<Board> for Unique {
    fn label(&self) -> &str {
        "unique"
    }

    fn execute(&mut self, _bb: &mut Board) -> BtStatus {
        BtStatus::Success
    }

    fn clone_task(&self) -> Result<Box<dyn Task<Board>>> {
        Err(BtError::clone_failed("unique", "owns a one-off resource"))
    }
}

#[test]
fn instances_are_independent() {
    let archetype = Tree::new(NodeDef::sequence([visit("a"), NodeDef::wait(1), visit("b")]));
    let mut first = archetype.instantiate(Board::default()).unwrap();
    let second = archetype.instantiate(Board::default()).unwrap();

    assert_eq!(first.step().unwrap(), Status::Running);
    assert_eq!(first.blackboard().unwrap().visits, ["a"]);
    assert_eq!(second.status(), Status::Fresh);
    assert!(second.blackboard().unwrap().visits.is_empty());
}

#[test]
fn stepping_an_instance_leaves_the_archetype_untouched() {
    let archetype = Tree::new(NodeDef::sequence([visit("a"), NodeDef::wait(1), visit("b")]));
    let before = labels(&archetype);
    let mut instance = archetype.instantiate(Board::default()).unwrap();

    assert_eq!(instance.step().unwrap(), Status::Running);
    assert_eq!(instance.step().unwrap(), Status::Succeeded);

    assert_eq!(archetype.len(), before.len());
    assert_eq!(labels(&archetype), before);
    assert!(archetype
        .ids()
        .all(|id| archetype.status_of(id) == Some(Status::Fresh)));
    assert!(archetype.blackboard().is_none());
}

#[test]
fn resolving_a_lazy_include_leaves_the_library_archetype_untouched() {
    let library = library();
    let mut tree = library.create_tree("patrol_lazy", Board::default()).unwrap();
    assert_eq!(tree.step().unwrap(), Status::Succeeded);
    assert_eq!(tree.len(), 6);

    let archetype = library.archetype("patrol_lazy").unwrap();
    assert_eq!(archetype.len(), 3);
    assert_eq!(labels(&archetype), ["sequence", "look", "include"]);
    assert!(archetype
        .ids()
        .all(|id| archetype.status_of(id) == Some(Status::Fresh)));

    let walk = library.archetype("walk").unwrap();
    assert!(walk.ids().all(|id| walk.status_of(id) == Some(Status::Fresh)));
}

#[test]
fn clone_of_a_running_tree_is_fresh() {
    let mut tree = Tree::with_blackboard(
        NodeDef::sequence([visit("a"), NodeDef::wait(3)]),
        Board::default(),
    );
    tree.step().unwrap();

    let copy = tree.clone_archetype().unwrap();
    assert!(copy.blackboard().is_none());
    assert_eq!(copy.steps(), 0);
    assert!(copy.ids().all(|id| copy.status_of(id) == Some(Status::Fresh)));
    assert_eq!(labels(&copy), labels(&tree));

    let again = copy.clone_archetype().unwrap();
    assert_eq!(labels(&again), labels(&copy));
}

#[test]
fn clone_fails_when_a_task_refuses() {
    let archetype: Tree<Board> = Tree::new(NodeDef::selector([visit("a"), NodeDef::leaf(Unique)]));
    let err = archetype.instantiate(Board::default()).unwrap_err();
    assert!(matches!(err, BtError::CloneFailed { ref label, .. } if label == "unique"));
}

fn library() -> TreeLibrary<Board> {
    let library = TreeLibrary::new();
    library.register("walk", Tree::new(NodeDef::sequence([visit("left"), visit("right")])));
    library.register(
        "patrol",
        Tree::new(NodeDef::sequence([visit("look"), NodeDef::include("walk")])),
    );
    library.register(
        "patrol_lazy",
        Tree::new(NodeDef::sequence([visit("look"), NodeDef::include_lazy("walk")])),
    );
    library
}

#[test]
fn eager_include_is_expanded_at_creation() {
    let library = library();
    let mut tree = library.create_tree("patrol", Board::default()).unwrap();

    assert!(tree.find("include").is_none());
    assert_eq!(labels(&tree), ["sequence", "look", "sequence", "left", "right"]);
    assert_eq!(tree.step().unwrap(), Status::Succeeded);
    assert_eq!(tree.blackboard().unwrap().visits, ["look", "left", "right"]);
}

#[test]
fn lazy_include_resolves_on_first_start() {
    struct Added(Rc<RefCell<Vec<(NodeId, usize)>>>);

    impl TreeListener for Added {
        fn status_updated(&mut self, _update: &StatusUpdate<'_>) {}

        fn child_added(&mut self, node: NodeId, index: usize) {
            self.0.borrow_mut().push((node, index));
        }
    }

    let library = library();
    let mut tree = library.create_tree("patrol_lazy", Board::default()).unwrap();
    let include = tree.find("include").unwrap();
    assert_eq!(tree.len(), 3);

    let added = Rc::new(RefCell::new(Vec::new()));
    tree.add_listener(Added(added.clone()));
    assert_eq!(tree.step().unwrap(), Status::Succeeded);
    assert_eq!(tree.len(), 6);
    assert_eq!(*added.borrow(), vec![(include, 0)]);
    assert_eq!(tree.blackboard().unwrap().visits, ["look", "left", "right"]);

    // Resolved once, then reused.
    tree.step().unwrap();
    assert_eq!(tree.len(), 6);

    // Cloning keeps the reference, not the resolved subtree.
    assert_eq!(tree.clone_archetype().unwrap().len(), 3);
}

#[test]
fn include_cycles_are_rejected() {
    let library: TreeLibrary<Board> = TreeLibrary::new();
    library.register("a", Tree::new(NodeDef::sequence([NodeDef::include("b")])));
    library.register("b", Tree::new(NodeDef::selector([NodeDef::include("a")])));
    library.register("self", Tree::new(NodeDef::invert(NodeDef::include("self"))));

    assert!(matches!(
        library.create_tree("a", Board::default()),
        Err(BtError::IncludeCycle(chain)) if chain == "a -> b -> a"
    ));
    assert!(matches!(
        library.create_tree("self", Board::default()),
        Err(BtError::IncludeCycle(_))
    ));
}

#[test]
fn unknown_names_are_reported() {
    let library = library();
    assert!(matches!(
        library.create_tree("missing", Board::default()),
        Err(BtError::UnknownTree(name)) if name == "missing"
    ));

    library.register("broken", Tree::new(NodeDef::include("nowhere")));
    assert!(matches!(
        library.create_tree("broken", Board::default()),
        Err(BtError::UnknownTree(name)) if name == "nowhere"
    ));
}

#[test]
fn includes_outside_a_library_fail_at_run_time() {
    let mut lazy = Tree::with_blackboard(NodeDef::include_lazy("walk"), Board::default());
    assert!(matches!(lazy.step(), Err(BtError::NoLibrary(_))));

    let mut eager = Tree::with_blackboard(NodeDef::include("walk"), Board::default());
    assert!(matches!(eager.step(), Err(BtError::UnresolvedInclude(_))));
}

#[test]
fn each_instance_gets_its_own_seed() {
    let library = library();
    let first = library.create_tree("walk", Board::default()).unwrap();
    let second = library.create_tree("walk", Board::default()).unwrap();

    assert_eq!(library.instances(), 2);
    assert_ne!(first.config().seed, second.config().seed);
    assert!(first.semaphores().same_registry(library.semaphores()));
    assert!(first.library().unwrap().same_library(&library));
}
