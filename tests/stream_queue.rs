// Test intent: verifies bounded queue FIFO delivery under backpressure and
// shutdown of blocked peers.
use std::thread;
use streamfft::queue::BoundedStreamQueue;
use streamfft::QueueError;

#[test]
fn many_chunks_through_a_small_queue_keep_order() {
    let q = BoundedStreamQueue::<u32>::new("fifo", 2, 8);
    let total = 1000u32;
    thread::scope(|s| {
        s.spawn(|| {
            for c in 0..total {
                let mut w = q.reserve_for_write().unwrap();
                for i in 0..8 {
                    assert!(w.push(c * 8 + i));
                }
                q.commit_write(w).unwrap();
            }
        });
        let mut expected = 0u32;
        for _ in 0..total {
            let r = q.wait_for_read().unwrap();
            assert_eq!(r.len(), 8);
            for &v in r.iter() {
                assert_eq!(v, expected);
                expected += 1;
            }
            q.release_read(r);
        }
    });
    assert!(q.is_drained());
    assert_eq!(q.counters(), (1000, 1000));
}

#[test]
fn close_unblocks_waiting_writer() {
    let q = BoundedStreamQueue::<f32>::new("full", 1, 4);
    let held = q.reserve_for_write().unwrap();
    thread::scope(|s| {
        let writer = s.spawn(|| q.reserve_for_write().map(|w| w.len()));
        q.close();
        assert_eq!(writer.join().unwrap(), Err(QueueError::Closed));
    });
    assert_eq!(q.commit_write(held), Err(QueueError::Closed));
    assert!(q.is_closed());
}
