//! Reacting to theme changes on the surface root.

use glimmer_core::{Subscription, Surface, THEME_ATTRIBUTE, Theme};
use tracing::info;

type ThemeCallback = Box<dyn FnMut(Theme)>;

/// Observes the root `data-theme` attribute and runs a callback per change.
pub struct ThemeWatcher {
    subscription: Option<Subscription>,
    callback: ThemeCallback,
    changes: usize,
}

impl std::fmt::Debug for ThemeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeWatcher")
            .field("subscription", &self.subscription)
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

impl ThemeWatcher {
    /// Watch with the default callback, which only logs the change.
    pub fn attach(surface: &mut Surface) -> Self {
        Self::with_callback(surface, |theme| info!(%theme, "theme changed"))
    }

    pub fn with_callback(surface: &mut Surface, callback: impl FnMut(Theme) + 'static) -> Self {
        Self {
            subscription: Some(surface.observe(&[THEME_ATTRIBUTE])),
            callback: Box::new(callback),
            changes: 0,
        }
    }

    /// Deliver pending changes. Returns the latest theme seen, if any.
    pub fn poll(&mut self, surface: &mut Surface) -> Option<Theme> {
        let subscription = self.subscription.as_ref()?;
        let mut latest = None;
        for record in surface.take_records(subscription) {
            if record.attribute != THEME_ATTRIBUTE {
                continue;
            }
            let theme = Theme::from_attribute(record.new_value.as_deref());
            (self.callback)(theme);
            self.changes += 1;
            latest = Some(theme);
        }
        latest
    }

    /// Stop observing.
    pub fn detach(&mut self, surface: &mut Surface) {
        if let Some(subscription) = self.subscription.take() {
            surface.detach(subscription);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of theme changes delivered so far.
    pub fn changes(&self) -> usize {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_callback_per_change() {
        let mut surface = Surface::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut watcher =
            ThemeWatcher::with_callback(&mut surface, move |theme| sink.borrow_mut().push(theme));

        surface.set_attribute(THEME_ATTRIBUTE, "dark");
        surface.set_attribute(THEME_ATTRIBUTE, "light");
        assert_eq!(watcher.poll(&mut surface), Some(Theme::Light));
        assert_eq!(*seen.borrow(), vec![Theme::Dark, Theme::Light]);
        assert_eq!(watcher.poll(&mut surface), None);
        assert_eq!(watcher.changes(), 2);
    }

    #[test]
    fn test_detach() {
        let mut surface = Surface::new();
        let mut watcher = ThemeWatcher::attach(&mut surface);
        watcher.detach(&mut surface);
        assert!(!watcher.is_attached());
        assert_eq!(surface.subscription_count(), 0);

        surface.set_attribute(THEME_ATTRIBUTE, "dark");
        assert_eq!(watcher.poll(&mut surface), None);
        assert_eq!(watcher.changes(), 0);
    }
}
