//! Ordering of on-screen notifications

use uuid::Uuid;

pub const TOAST_WIDTH: i32 = 340;
pub const TOAST_HEIGHT: i32 = 72;
pub const TOAST_SPACING: i32 = 8;

pub type ToastId = Uuid;

/// Explicit registry of open toasts, oldest first.
///
/// The newest toast has order 0 and sits closest to the screen corner; older
/// ones stack upwards.
#[derive(Debug, Default)]
pub struct NotificationStack {
    toasts: Vec<ToastId>,
    hidden: bool,
}

impl NotificationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: ToastId) {
        if !self.toasts.contains(&id) {
            self.toasts.push(id);
        }
    }

    pub fn remove(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| *t != id);
        self.toasts.len() != before
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn order(&self, id: ToastId) -> Option<usize> {
        let index = self.toasts.iter().position(|t| *t == id)?;
        Some(self.toasts.len() - index - 1)
    }

    /// Distance from the bottom edge of the stack
    pub fn offset(&self, id: ToastId) -> Option<i32> {
        self.order(id)
            .map(|order| order as i32 * (TOAST_HEIGHT + TOAST_SPACING))
    }

    /// `(id, order)` newest first
    pub fn layout(&self) -> Vec<(ToastId, usize)> {
        self.toasts
            .iter()
            .rev()
            .enumerate()
            .map(|(order, id)| (*id, order))
            .collect()
    }

    pub fn hide_all(&mut self) {
        self.hidden = true;
    }

    pub fn show_all(&mut self) {
        self.hidden = false;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_toast_comes_first() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut stack = NotificationStack::new();
        stack.push(a);
        stack.push(b);
        stack.push(c);

        assert_eq!(stack.order(c), Some(0));
        assert_eq!(stack.order(b), Some(1));
        assert_eq!(stack.order(a), Some(2));
        assert_eq!(stack.offset(a), Some(2 * (TOAST_HEIGHT + TOAST_SPACING)));
        assert_eq!(stack.layout(), vec![(c, 0), (b, 1), (a, 2)]);
    }

    #[test]
    fn removal_reorders() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut stack = NotificationStack::new();
        stack.push(a);
        stack.push(b);
        stack.push(c);

        assert!(stack.remove(c));
        assert!(!stack.remove(c));

        assert_eq!(stack.order(b), Some(0));
        assert_eq!(stack.order(a), Some(1));
        assert_eq!(stack.order(c), None);
        assert_eq!(stack.offset(b), Some(0));
    }

    #[test]
    fn duplicate_push_is_ignored() {
        let a = Uuid::new_v4();
        let mut stack = NotificationStack::new();
        stack.push(a);
        stack.push(a);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn hide_and_show_keep_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut stack = NotificationStack::new();
        stack.push(a);
        stack.push(b);

        stack.hide_all();
        assert!(stack.is_hidden());
        stack.show_all();
        assert!(!stack.is_hidden());
        assert_eq!(stack.layout(), vec![(b, 0), (a, 1)]);
    }
}
