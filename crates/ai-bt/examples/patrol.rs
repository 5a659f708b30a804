//! A guard that patrols between waypoints and chases intruders it can see.
//!
//! Run with `RUST_LOG=ai_bt=debug cargo run -p ai-bt --example patrol`.

use ai_bt::{BtStatus, NodeDef, Status, StatusUpdate, Tree, TreeConfig, TreeLibrary, TreeListener};
use ai_core::{BbKey, Blackboard};
use tracing_subscriber::{fmt, EnvFilter};

const POSITION: BbKey<i32> = BbKey::new("position");
const WAYPOINT: BbKey<usize> = BbKey::new("waypoint");
const INTRUDER: BbKey<Option<i32>> = BbKey::new("intruder");

const WAYPOINTS: [i32; 3] = [0, 4, -3];

fn move_towards(bb: &mut Blackboard, target: i32) -> BtStatus {
    let position = bb.get_or_insert_with(POSITION, || 0);
    if *position == target {
        return BtStatus::Success;
    }
    *position += (target - *position).signum();
    BtStatus::Running
}

fn patrol() -> NodeDef<Blackboard> {
    NodeDef::sequence([
        NodeDef::action("walk_to_waypoint", |bb: &mut Blackboard| {
            let waypoint = bb.get(WAYPOINT).copied().unwrap_or(0);
            move_towards(bb, WAYPOINTS[waypoint])
        }),
        NodeDef::wait(1),
        NodeDef::action("next_waypoint", |bb: &mut Blackboard| {
            let waypoint = bb.get_or_insert_with(WAYPOINT, || 0);
            *waypoint = (*waypoint + 1) % WAYPOINTS.len();
            BtStatus::Success
        }),
    ])
}

fn chase() -> NodeDef<Blackboard> {
    NodeDef::sequence([
        NodeDef::condition("sees_intruder", |bb: &Blackboard| {
            matches!(bb.get(INTRUDER), Some(Some(_)))
        }),
        NodeDef::semaphore_guard(
            "alarm",
            NodeDef::action("chase_intruder", |bb: &mut Blackboard| {
                let Some(target) = bb.get(INTRUDER).copied().flatten() else {
                    return BtStatus::Failure;
                };
                let status = move_towards(bb, target);
                if status == BtStatus::Success {
                    bb.set(INTRUDER, None);
                    tracing::info!(target, "intruder caught");
                }
                status
            }),
        ),
    ])
}

struct Transitions;

impl TreeListener for Transitions {
    fn status_updated(&mut self, update: &StatusUpdate<'_>) {
        if update.previous != update.current {
            tracing::info!(
                node = %update.node,
                label = update.label,
                "{} -> {}",
                update.previous,
                update.current
            );
        }
    }
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let library = TreeLibrary::with_config(TreeConfig::default().with_seed(7));
    library.semaphores().define("alarm", 1);
    library.register("patrol", Tree::new(patrol()));
    library.register("chase", Tree::new(chase()));
    library.register(
        "guard",
        Tree::new(NodeDef::repeat_forever(NodeDef::selector([
            NodeDef::include("chase"),
            NodeDef::include_lazy("patrol"),
        ]))),
    );

    let mut guard = library.create_tree("guard", Blackboard::new())?;
    guard.add_listener(Transitions);

    for step in 1..=20 {
        if step == 12 {
            if let Some(bb) = guard.blackboard_mut() {
                bb.set(INTRUDER, Some(-2));
            }
        }
        let status = guard.step()?;
        let position = guard
            .blackboard()
            .and_then(|bb| bb.get(POSITION).copied())
            .unwrap_or(0);
        tracing::info!(step, %status, position, "tick");
        if status != Status::Running {
            break;
        }
    }

    guard.cancel()?;
    Ok(())
}
