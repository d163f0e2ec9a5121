//! Hotkey bindings and dispatch

use crate::events::{EventTable, SubscriptionId};
use crate::key::{HotKey, Modifiers, VirtualKey};
use crate::tracker::KeyEdge;
use crate::{HotKeyError, HotKeyResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingAction {
    CaptureScreen,
    CloseCropView,
}

/// Keys whose every transition is reported, bound or not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Ctrl,
    Shift,
    Alt,
    Escape,
}

impl ModifierKey {
    pub const ALL: [ModifierKey; 4] = [
        ModifierKey::Ctrl,
        ModifierKey::Shift,
        ModifierKey::Alt,
        ModifierKey::Escape,
    ];

    pub fn key(&self) -> VirtualKey {
        match self {
            ModifierKey::Ctrl => VirtualKey::CONTROL,
            ModifierKey::Shift => VirtualKey::SHIFT,
            ModifierKey::Alt => VirtualKey::MENU,
            ModifierKey::Escape => VirtualKey::ESCAPE,
        }
    }

    pub fn from_key(key: VirtualKey) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }
}

/// Owns the action bindings and the callbacks subscribed to them.
///
/// Lives on the UI thread; the poller only produces [`KeyEdge`]s.
#[derive(Default)]
pub struct HotKeyManager {
    bindings: BTreeMap<BindingAction, HotKey>,
    actions: EventTable<BindingAction, HotKey>,
    modifiers: EventTable<ModifierKey, bool>,
    held: Modifiers,
}

impl HotKeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, action: BindingAction, hotkey: HotKey) -> HotKeyResult<()> {
        if self.bindings.contains_key(&action) {
            return Err(HotKeyError::AlreadyBound(action));
        }

        tracing::info!(?action, %hotkey, "hotkey bound");
        self.bindings.insert(action, hotkey);
        Ok(())
    }

    /// Replace the binding of `action`; subscribers stay attached
    pub fn rebind(&mut self, action: BindingAction, hotkey: HotKey) -> Option<HotKey> {
        let previous = self.bindings.insert(action, hotkey);
        tracing::info!(?action, %hotkey, ?previous, "hotkey rebound");
        previous
    }

    /// Remove the binding; subscribers stay attached for a later bind
    pub fn unbind(&mut self, action: BindingAction) -> Option<HotKey> {
        self.bindings.remove(&action)
    }

    pub fn binding(&self, action: BindingAction) -> Option<HotKey> {
        self.bindings.get(&action).copied()
    }

    pub fn on_action(
        &mut self,
        action: BindingAction,
        callback: impl FnMut(&HotKey) + 'static,
    ) -> SubscriptionId {
        self.actions.subscribe(action, callback)
    }

    /// `callback` receives true on press and false on release
    pub fn on_modifier(
        &mut self,
        key: ModifierKey,
        callback: impl FnMut(&bool) + 'static,
    ) -> SubscriptionId {
        self.modifiers.subscribe(key, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.actions.unsubscribe(id) || self.modifiers.unsubscribe(id)
    }

    pub fn unsubscribe_action(&mut self, action: BindingAction) -> usize {
        self.actions.unsubscribe_all(&action)
    }

    /// Every key the poller has to watch: modifiers plus bound keys
    pub fn watched_keys(&self) -> Vec<VirtualKey> {
        let mut keys: Vec<VirtualKey> = ModifierKey::ALL.iter().map(|m| m.key()).collect();
        keys.extend(self.bindings.values().map(|hk| hk.key));
        keys.sort();
        keys.dedup();
        keys
    }

    /// Modifier state as seen through the handled edges
    pub fn held(&self) -> Modifiers {
        self.held
    }

    /// Dispatch one key transition, returning the actions that fired
    pub fn handle(&mut self, edge: KeyEdge) -> Vec<BindingAction> {
        let down = edge.is_down();

        match edge.key {
            VirtualKey::CONTROL => self.held.ctrl = down,
            VirtualKey::SHIFT => self.held.shift = down,
            VirtualKey::MENU => self.held.alt = down,
            _ => {}
        }

        if let Some(modifier) = ModifierKey::from_key(edge.key) {
            self.modifiers.emit(&modifier, &down);
        }

        if !down {
            return Vec::new();
        }

        let held = self.held;
        let fired: Vec<(BindingAction, HotKey)> = self
            .bindings
            .iter()
            .filter(|(_, hk)| hk.key == edge.key && hk.modifiers == held)
            .map(|(action, hk)| (*action, *hk))
            .collect();

        for (action, hotkey) in &fired {
            tracing::debug!(?action, %hotkey, "hotkey pressed");
            self.actions.emit(action, hotkey);
        }

        fired.into_iter().map(|(action, _)| action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn press(manager: &mut HotKeyManager, keys: &[VirtualKey]) -> Vec<BindingAction> {
        let mut fired = Vec::new();
        for &key in keys {
            fired.extend(manager.handle(KeyEdge::down(key)));
        }
        for &key in keys.iter().rev() {
            fired.extend(manager.handle(KeyEdge::up(key)));
        }
        fired
    }

    #[test]
    fn double_bind_is_rejected() {
        let mut manager = HotKeyManager::new();
        let hk = HotKey::parse("PrintScreen").unwrap();
        manager.bind(BindingAction::CaptureScreen, hk).unwrap();

        assert!(matches!(
            manager.bind(BindingAction::CaptureScreen, hk),
            Err(HotKeyError::AlreadyBound(BindingAction::CaptureScreen))
        ));
    }

    #[test]
    fn requires_exact_modifiers() {
        let mut manager = HotKeyManager::new();
        manager
            .bind(BindingAction::CaptureScreen, HotKey::parse("Ctrl+S").unwrap())
            .unwrap();
        let s = VirtualKey::letter('s').unwrap();

        assert!(press(&mut manager, &[s]).is_empty());
        assert!(press(&mut manager, &[VirtualKey::CONTROL, VirtualKey::SHIFT, s]).is_empty());
        assert_eq!(
            press(&mut manager, &[VirtualKey::CONTROL, s]),
            vec![BindingAction::CaptureScreen]
        );
    }

    #[test]
    fn modifier_subscribers_see_both_edges() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut manager = HotKeyManager::new();

        let log = seen.clone();
        manager.on_modifier(ModifierKey::Shift, move |down| log.borrow_mut().push(*down));

        press(&mut manager, &[VirtualKey::SHIFT]);
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!manager.held().shift);
    }

    #[test]
    fn watched_keys_include_modifiers_and_bindings() {
        let mut manager = HotKeyManager::new();
        manager
            .bind(BindingAction::CaptureScreen, HotKey::parse("PrintScreen").unwrap())
            .unwrap();
        manager
            .bind(BindingAction::CloseCropView, HotKey::parse("Esc").unwrap())
            .unwrap();

        assert_eq!(
            manager.watched_keys(),
            vec![
                VirtualKey::SHIFT,
                VirtualKey::CONTROL,
                VirtualKey::MENU,
                VirtualKey::ESCAPE,
                VirtualKey::SNAPSHOT
            ]
        );
    }
}
