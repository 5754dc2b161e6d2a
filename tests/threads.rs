use sprite_document::{Document, LockError, LockState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

const WORKERS: usize = 8;
const ROUNDS: usize = 2_000;

#[test]
fn writers_never_overlap() {
    let document = Document::new(0usize);
    let readers = AtomicUsize::new(0);
    let writers = AtomicUsize::new(0);
    let writes = AtomicUsize::new(0);
    let barrier = Barrier::new(WORKERS);

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            let (document, readers, writers, writes, barrier) =
                (&document, &readers, &writers, &writes, &barrier);

            scope.spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    if (worker + round) % 3 == 0 {
                        if let Ok(mut sprite) = document.write() {
                            assert_eq!(writers.fetch_add(1, Ordering::SeqCst), 0);
                            assert_eq!(readers.load(Ordering::SeqCst), 0);
                            *sprite += 1;
                            writes.fetch_add(1, Ordering::SeqCst);
                            writers.fetch_sub(1, Ordering::SeqCst);
                        }
                    } else if let Ok(sprite) = document.read() {
                        readers.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(writers.load(Ordering::SeqCst), 0);
                        let _ = *sprite;
                        readers.fetch_sub(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    assert_eq!(document.lock_state(), LockState::Unlocked);
    assert_eq!(*document.read().unwrap(), writes.load(Ordering::SeqCst));
}

#[test]
fn concurrent_readers_can_not_upgrade() {
    let document = Document::new(Vec::<u8>::new());
    let barrier = Barrier::new(2);

    thread::scope(|scope| {
        for _ in 0..2 {
            let (document, barrier) = (&document, &barrier);
            scope.spawn(move || {
                let mut reader = document.read().unwrap();
                barrier.wait();
                assert_eq!(reader.upgrade().unwrap_err(), LockError::CannotUpgrade);
                barrier.wait();
            });
        }
    });

    assert_eq!(document.lock_state(), LockState::Unlocked);
}

#[test]
fn upgrade_excludes_other_threads() {
    let document = Document::new(Vec::<u8>::new());
    let barrier = Barrier::new(2);

    thread::scope(|scope| {
        let (document, barrier) = (&document, &barrier);

        scope.spawn(move || {
            let mut reader = document.read().unwrap();
            let mut upgrade = reader.upgrade().unwrap();
            upgrade.push(1);
            barrier.wait();
            // The other thread checks while we are still the writer.
            barrier.wait();
            drop(upgrade);
            barrier.wait();
            assert_eq!(*reader, [1]);
            barrier.wait();
        });

        scope.spawn(move || {
            barrier.wait();
            assert_eq!(document.read().unwrap_err(), LockError::CannotRead);
            barrier.wait();
            barrier.wait();
            // Downgraded, so readers are welcome but writers are not.
            assert_eq!(*document.read().unwrap(), [1]);
            assert_eq!(document.write().unwrap_err(), LockError::CannotWrite);
            barrier.wait();
        });
    });

    assert_eq!(document.lock_state(), LockState::Unlocked);
}
