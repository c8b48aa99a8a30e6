use super::*;

#[test]
fn test_enter_and_leave() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(4, 100);
    assert_eq!(guard.enter(1), RecursionResult::Entered);
    assert!(guard.is_visiting(&1));
    assert_eq!(guard.depth(), 1);
    guard.leave(&1);
    assert_eq!(guard.depth(), 0);
    assert!(!guard.is_visiting(&1));
}

#[test]
fn test_cycle_detected_for_same_key() {
    let mut guard: RecursionGuard<String> = RecursionGuard::new(4, 100);
    let key = "Alias".to_string();
    assert!(guard.enter(key.clone()).is_entered());
    assert!(guard.enter(key.clone()).is_cycle());
    guard.leave(&key);
    assert!(!guard.is_exceeded());
}

#[test]
fn test_depth_limit_is_sticky() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(2, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    guard.leave(&2);
    guard.leave(&1);
    assert!(guard.is_exceeded());
    guard.reset();
    assert!(!guard.is_exceeded());
}

#[test]
fn test_iteration_limit() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(10, 3);
    for key in 0..3 {
        assert!(guard.enter(key).is_entered());
        guard.leave(&key);
    }
    assert_eq!(guard.enter(99), RecursionResult::IterationExceeded);
    assert!(guard.enter(100).is_exceeded());
    assert_eq!(guard.iterations(), 5);
}
