use super::barrier::{Barrier, BarrierAborted};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn single_party_releases_immediately() {
    let barrier = Barrier::new(1);
    assert_eq!(barrier.parties(), 1);
    assert_eq!(barrier.wait(), Ok(()));
    // Cyclic: a second round works too.
    assert_eq!(barrier.wait(), Ok(()));
}

#[test]
fn no_thread_passes_before_all_arrive() {
    const N: usize = 8;
    let barrier = Barrier::new(N);
    let arrived = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..N {
            s.spawn(|| {
                arrived.fetch_add(1, Ordering::Relaxed);
                barrier.wait().unwrap();
                // If any thread got here early, it would observe fewer
                // than N arrivals.
                assert_eq!(arrived.load(Ordering::Relaxed), N);
            });
        }
    });
}

#[test]
fn writes_before_wait_visible_after_release() {
    // The size-table pattern: each thread fills its own slot before
    // the barrier and must see every slot afterwards.
    const N: usize = 4;
    let barrier = Barrier::new(N);
    let slots: Vec<AtomicUsize> = (0..N).map(|_| AtomicUsize::new(0)).collect();

    thread::scope(|s| {
        for i in 0..N {
            let slots = &slots;
            let barrier = &barrier;
            s.spawn(move || {
                slots[i].store(i + 1, Ordering::Relaxed);
                barrier.wait().unwrap();
                for (j, slot) in slots.iter().enumerate() {
                    assert_eq!(slot.load(Ordering::Relaxed), j + 1);
                }
            });
        }
    });
}

#[test]
fn reusable_across_rounds() {
    const N: usize = 3;
    const ROUNDS: usize = 5;
    let barrier = Barrier::new(N);
    let counter = AtomicUsize::new(0);

    thread::scope(|s| {
        for _ in 0..N {
            s.spawn(|| {
                for round in 0..ROUNDS {
                    counter.fetch_add(1, Ordering::Relaxed);
                    barrier.wait().unwrap();
                    // Every thread has bumped the counter this round.
                    assert!(counter.load(Ordering::Relaxed) >= (round + 1) * N);
                    barrier.wait().unwrap();
                }
            });
        }
    });

    assert_eq!(counter.load(Ordering::Relaxed), N * ROUNDS);
}

#[test]
fn abort_releases_blocked_waiters() {
    let barrier = Barrier::new(3);

    thread::scope(|s| {
        let waiters: Vec<_> = (0..2)
            .map(|_| s.spawn(|| barrier.wait()))
            .collect();

        // Give the waiters time to block, then abort instead of arriving.
        thread::sleep(Duration::from_millis(50));
        barrier.abort();

        for handle in waiters {
            assert_eq!(handle.join().unwrap(), Err(BarrierAborted));
        }
    });
}

#[test]
fn wait_after_abort_fails_immediately() {
    let barrier = Barrier::new(2);
    barrier.abort();
    assert_eq!(barrier.wait(), Err(BarrierAborted));
    // Still aborted; abort is sticky.
    barrier.abort();
    assert_eq!(barrier.wait(), Err(BarrierAborted));
}

#[test]
#[should_panic(expected = "at least one party")]
fn zero_parties_panics() {
    let _ = Barrier::new(0);
}
