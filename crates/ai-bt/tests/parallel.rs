use ai_bt::{BtStatus, NodeDef, Orchestrator, Policy, Result, Status, Task, Tree};

/// Scripted outcomes and execution counts, one slot per child.
#[derive(Debug)]
struct Board {
    outcomes: [BtStatus; 2],
    executions: [u32; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            outcomes: [BtStatus::Running; 2],
            executions: [0; 2],
        }
    }
}

#[derive(Debug, Clone)]
struct Scripted(usize);

impl Task<Board> for Scripted {
    fn label(&self) -> &str {
        "scripted"
    }

    fn execute(&mut self, bb: &mut Board) -> BtStatus {
        bb.executions[self.0] += 1;
        bb.outcomes[self.0]
    }

    fn clone_task(&self) -> Result<Box<dyn Task<Board>>> {
        Ok(Box::new(self.clone()))
    }
}

fn pair(policy: Policy, orchestrator: Orchestrator) -> Tree<Board> {
    Tree::with_blackboard(
        NodeDef::parallel(
            policy,
            orchestrator,
            [NodeDef::leaf(Scripted(0)), NodeDef::leaf(Scripted(1))],
        ),
        Board::default(),
    )
}

fn script(tree: &mut Tree<Board>, slot: usize, outcome: BtStatus) {
    tree.blackboard_mut().unwrap().outcomes[slot] = outcome;
}

fn step(tree: &mut Tree<Board>) -> (Status, [u32; 2]) {
    let status = tree.step().unwrap();
    (status, tree.blackboard().unwrap().executions)
}

#[test]
fn resume_sequence_waits_for_every_child_in_one_tick() {
    let mut tree = pair(Policy::Sequence, Orchestrator::Resume);
    assert_eq!(step(&mut tree), (Status::Running, [1, 1]));

    script(&mut tree, 0, BtStatus::Success);
    assert_eq!(step(&mut tree), (Status::Running, [2, 2]));
    assert_eq!(step(&mut tree), (Status::Running, [3, 3]));

    script(&mut tree, 1, BtStatus::Success);
    assert_eq!(step(&mut tree), (Status::Succeeded, [4, 4]));
}

#[test]
fn resume_selector_short_circuits_on_success() {
    let mut tree = pair(Policy::Selector, Orchestrator::Resume);
    assert_eq!(step(&mut tree), (Status::Running, [1, 1]));
    assert_eq!(step(&mut tree), (Status::Running, [2, 2]));

    script(&mut tree, 0, BtStatus::Success);
    assert_eq!(step(&mut tree), (Status::Succeeded, [3, 2]));
    assert_eq!(step(&mut tree), (Status::Succeeded, [4, 2]));
}

#[test]
fn join_sequence_freezes_finished_children() {
    let mut tree = pair(Policy::Sequence, Orchestrator::Join);
    assert_eq!(step(&mut tree), (Status::Running, [1, 1]));

    script(&mut tree, 0, BtStatus::Success);
    assert_eq!(step(&mut tree), (Status::Running, [2, 2]));
    assert_eq!(step(&mut tree), (Status::Running, [2, 3]));

    script(&mut tree, 1, BtStatus::Success);
    assert_eq!(step(&mut tree), (Status::Succeeded, [2, 4]));

    script(&mut tree, 0, BtStatus::Running);
    script(&mut tree, 1, BtStatus::Running);
    assert_eq!(step(&mut tree), (Status::Running, [3, 5]));
}

#[test]
fn join_selector_starts_a_new_round_after_resolving() {
    let mut tree = pair(Policy::Selector, Orchestrator::Join);
    assert_eq!(step(&mut tree), (Status::Running, [1, 1]));

    script(&mut tree, 0, BtStatus::Failure);
    assert_eq!(step(&mut tree), (Status::Running, [2, 2]));

    script(&mut tree, 1, BtStatus::Success);
    assert_eq!(step(&mut tree), (Status::Succeeded, [2, 3]));
    assert_eq!(step(&mut tree), (Status::Succeeded, [3, 4]));
}

#[test]
fn sequence_policy_fails_as_soon_as_a_child_fails() {
    let mut tree = pair(Policy::Sequence, Orchestrator::Resume);
    script(&mut tree, 0, BtStatus::Failure);
    assert_eq!(step(&mut tree), (Status::Failed, [1, 0]));
}

#[test]
fn running_siblings_are_cancelled_on_resolution() {
    let mut tree = pair(Policy::Selector, Orchestrator::Resume);
    step(&mut tree);
    script(&mut tree, 0, BtStatus::Success);
    step(&mut tree);

    let second = tree.child(tree.root().unwrap(), 1).unwrap();
    assert_eq!(tree.status_of(second), Some(Status::Cancelled));
}

#[test]
fn join_selector_fails_once_every_child_failed() {
    let mut tree = pair(Policy::Selector, Orchestrator::Join);
    script(&mut tree, 0, BtStatus::Failure);
    assert_eq!(step(&mut tree), (Status::Running, [1, 1]));

    script(&mut tree, 1, BtStatus::Failure);
    assert_eq!(step(&mut tree), (Status::Failed, [1, 2]));
}

#[test]
fn empty_parallel_resolves_on_first_run() {
    let mut all: Tree<Board> = Tree::with_blackboard(
        NodeDef::parallel(Policy::Sequence, Orchestrator::Join, []),
        Board::default(),
    );
    assert_eq!(all.step().unwrap(), Status::Succeeded);

    let mut any: Tree<Board> = Tree::with_blackboard(
        NodeDef::parallel(Policy::Selector, Orchestrator::Resume, []),
        Board::default(),
    );
    assert_eq!(any.step().unwrap(), Status::Failed);
}

#[test]
fn join_round_restarts_after_cancellation() {
    let mut tree = pair(Policy::Sequence, Orchestrator::Join);
    script(&mut tree, 0, BtStatus::Success);
    assert_eq!(step(&mut tree), (Status::Running, [1, 1]));

    tree.cancel().unwrap();
    assert_eq!(step(&mut tree), (Status::Running, [2, 2]));
}

#[test]
fn join_cancelled_by_enclosing_parallel_reruns_finished_children() {
    let inner = NodeDef::parallel(
        Policy::Sequence,
        Orchestrator::Join,
        [NodeDef::leaf(Scripted(0)), NodeDef::leaf(Scripted(1))],
    );
    let root = NodeDef::parallel(
        Policy::Selector,
        Orchestrator::Resume,
        [inner, NodeDef::success()],
    );
    let mut tree = Tree::with_blackboard(root, Board::default());
    script(&mut tree, 0, BtStatus::Success);

    assert_eq!(step(&mut tree), (Status::Succeeded, [1, 1]));
    let inner = tree.child(tree.root().unwrap(), 0).unwrap();
    assert_eq!(tree.status_of(inner), Some(Status::Cancelled));

    assert_eq!(step(&mut tree), (Status::Succeeded, [2, 2]));
}
