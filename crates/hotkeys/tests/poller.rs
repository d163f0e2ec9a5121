use crossbeam_channel::unbounded;
use hotkeys::{HotKeyPoller, KeyEdge, KeyStateSource, VirtualKey};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Replays one "pressed" flag per poll, then reports released forever
struct ScriptedSource {
    key: VirtualKey,
    script: Arc<Mutex<VecDeque<bool>>>,
}

impl KeyStateSource for ScriptedSource {
    fn is_down(&self, key: VirtualKey) -> bool {
        key == self.key && self.script.lock().pop_front().unwrap_or(false)
    }
}

#[test]
fn poller_reports_press_and_release_once() {
    let script = Arc::new(Mutex::new(VecDeque::from(vec![
        false, true, true, true, false, false,
    ])));
    let source = ScriptedSource {
        key: VirtualKey::SNAPSHOT,
        script,
    };

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    let (tx, rx) = unbounded();

    let mut poller = HotKeyPoller::start(source, vec![VirtualKey::SNAPSHOT], tx, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(first, KeyEdge::down(VirtualKey::SNAPSHOT));
    assert_eq!(second, KeyEdge::up(VirtualKey::SNAPSHOT));

    std::thread::sleep(Duration::from_millis(50));
    assert!(rx.try_recv().is_err());
    assert_eq!(notified.load(Ordering::SeqCst), 2);

    poller.stop();
    assert!(!poller.is_running());
}

#[test]
fn poller_exits_when_receiver_is_dropped() {
    let source = ScriptedSource {
        key: VirtualKey::ESCAPE,
        script: Arc::new(Mutex::new(VecDeque::from(vec![true]))),
    };
    let (tx, rx) = unbounded();
    drop(rx);

    let poller = HotKeyPoller::start(source, vec![VirtualKey::ESCAPE], tx, || {}).unwrap();

    for _ in 0..100 {
        if !poller.is_running() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(!poller.is_running());
}
