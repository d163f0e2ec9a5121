use hotkeys::{BindingAction, HotKey, HotKeyManager, KeyEdge, VirtualKey};
use std::cell::RefCell;
use std::rc::Rc;

fn tap(manager: &mut HotKeyManager, key: VirtualKey) -> Vec<BindingAction> {
    let fired = manager.handle(KeyEdge::down(key));
    manager.handle(KeyEdge::up(key));
    fired
}

#[test]
fn rebind_keeps_subscribers_and_moves_key() {
    let captures = Rc::new(RefCell::new(0));
    let mut manager = HotKeyManager::new();
    manager
        .bind(BindingAction::CaptureScreen, HotKey::parse("PrintScreen").unwrap())
        .unwrap();

    let counter = captures.clone();
    manager.on_action(BindingAction::CaptureScreen, move |_| *counter.borrow_mut() += 1);

    tap(&mut manager, VirtualKey::SNAPSHOT);
    assert_eq!(*captures.borrow(), 1);

    let previous = manager.rebind(BindingAction::CaptureScreen, HotKey::parse("F9").unwrap());
    assert_eq!(previous, Some(HotKey::parse("PrintScreen").unwrap()));

    assert!(tap(&mut manager, VirtualKey::SNAPSHOT).is_empty());
    assert_eq!(
        tap(&mut manager, VirtualKey::function(9).unwrap()),
        vec![BindingAction::CaptureScreen]
    );
    assert_eq!(*captures.borrow(), 2);
}

#[test]
fn unsubscribed_callbacks_never_fire() {
    let hits = Rc::new(RefCell::new(Vec::new()));
    let mut manager = HotKeyManager::new();
    manager
        .bind(BindingAction::CaptureScreen, HotKey::parse("PrintScreen").unwrap())
        .unwrap();

    let a = hits.clone();
    let first = manager.on_action(BindingAction::CaptureScreen, move |_| a.borrow_mut().push("a"));
    let b = hits.clone();
    manager.on_action(BindingAction::CaptureScreen, move |_| b.borrow_mut().push("b"));

    assert!(manager.unsubscribe(first));
    tap(&mut manager, VirtualKey::SNAPSHOT);
    assert_eq!(*hits.borrow(), vec!["b"]);

    assert_eq!(manager.unsubscribe_action(BindingAction::CaptureScreen), 1);
    tap(&mut manager, VirtualKey::SNAPSHOT);
    assert_eq!(*hits.borrow(), vec!["b"]);
}

#[test]
fn unbound_action_stays_silent() {
    let mut manager = HotKeyManager::new();
    manager
        .bind(BindingAction::CloseCropView, HotKey::parse("Esc").unwrap())
        .unwrap();
    assert!(manager.unbind(BindingAction::CloseCropView).is_some());
    assert!(tap(&mut manager, VirtualKey::ESCAPE).is_empty());
    assert!(manager.binding(BindingAction::CloseCropView).is_none());
}
