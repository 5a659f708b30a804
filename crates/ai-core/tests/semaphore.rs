use ai_core::Semaphores;

#[test]
fn undefined_semaphore_has_one_permit() {
    let sems = Semaphores::new();
    assert_eq!(sems.available("door"), None);
    assert!(sems.try_acquire("door"));
    assert_eq!(sems.permits("door"), Some(1));
    assert!(!sems.try_acquire("door"));
    assert!(sems.release("door"));
    assert!(sems.try_acquire("door"));
}

#[test]
fn defined_permits_are_counted() {
    let sems = Semaphores::new();
    sems.define("ladder", 2);
    assert!(sems.try_acquire("ladder"));
    assert!(sems.try_acquire("ladder"));
    assert!(!sems.try_acquire("ladder"));
    assert_eq!(sems.available("ladder"), Some(0));
}

#[test]
fn release_never_exceeds_permits() {
    let sems = Semaphores::new();
    sems.define("gate", 1);
    assert!(!sems.release("gate"));
    assert!(!sems.release("unknown"));
    assert_eq!(sems.available("gate"), Some(1));
}

#[test]
fn clones_share_the_registry() {
    let a = Semaphores::new();
    let b = a.clone();
    assert!(a.same_registry(&b));
    assert!(!a.same_registry(&Semaphores::new()));

    assert!(a.try_acquire("well"));
    assert!(!b.try_acquire("well"));
    assert!(b.release("well"));
    assert!(a.try_acquire("well"));
}
