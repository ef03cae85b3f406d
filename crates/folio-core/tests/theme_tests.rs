// Host-side tests for the theme signal and derived backdrop.

use folio_core::constants::srgb_hex;
use folio_core::{Backdrop, ThemeBackdrop, ThemeSignal};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn listeners_hear_changes_only() {
    let theme = ThemeSignal::new(true);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _sub = theme.subscribe(move |dark| sink.borrow_mut().push(dark));

    theme.set(true); // unchanged
    theme.set(false);
    theme.set(false); // unchanged
    theme.toggle();
    assert_eq!(*seen.borrow(), vec![false, true]);
    assert!(theme.is_dark());
}

#[test]
fn subscription_cancel_is_idempotent_and_runs_on_drop() {
    let theme = ThemeSignal::default();
    let mut a = theme.subscribe(|_| {});
    let b = theme.subscribe(|_| {});
    assert_eq!(theme.subscriber_count(), 2);
    a.cancel();
    a.cancel();
    assert!(!a.is_active());
    assert_eq!(theme.subscriber_count(), 1);
    drop(b);
    assert_eq!(theme.subscriber_count(), 0);
}

#[test]
fn listener_may_cancel_during_notification() {
    let theme = ThemeSignal::new(false);
    let held: Rc<RefCell<Option<folio_core::ThemeSubscription>>> = Rc::default();
    let slot = held.clone();
    let sub = theme.subscribe(move |_| {
        if let Some(mut s) = slot.borrow_mut().take() {
            s.cancel();
        }
    });
    *held.borrow_mut() = Some(sub);
    theme.toggle();
    assert_eq!(theme.subscriber_count(), 0);
}

#[test]
fn backdrop_values_per_theme() {
    let dark = Backdrop::for_theme(true);
    assert_eq!(dark.gradient_inner, srgb_hex(0x0a0a0a, 1.0));
    assert_eq!(dark.gradient_outer, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!((dark.ambient, dark.directional), (0.1, 0.3));

    let light = Backdrop::for_theme(false);
    assert_eq!(light.gradient_inner, srgb_hex(0xffffff, 1.0));
    assert!(light.gradient_inner.iter().all(|c| (c - 1.0).abs() < 1e-5));
    assert_eq!(light.gradient_outer, srgb_hex(0xf8f9fa, 1.0));
    assert_eq!((light.ambient, light.directional), (0.3, 0.5));
}

#[test]
fn theme_backdrop_follows_until_detached() {
    let theme = ThemeSignal::new(true);
    let mut backdrop = ThemeBackdrop::observe(&theme);
    assert_eq!(backdrop.current(), Backdrop::for_theme(true));
    theme.toggle();
    assert_eq!(backdrop.current(), Backdrop::for_theme(false));

    backdrop.detach();
    assert!(!backdrop.is_attached());
    theme.toggle();
    assert_eq!(backdrop.current(), Backdrop::for_theme(false));
}

struct Source {
    removed: Rc<RefCell<u32>>,
}

impl folio_core::ListenerBinding for Source {
    fn remove(&mut self) {
        *self.removed.borrow_mut() += 1;
    }
}

#[test]
fn theme_source_lives_as_long_as_its_leases() {
    let theme = ThemeSignal::default();
    let installs = Rc::new(RefCell::new(0));
    let removed = Rc::new(RefCell::new(0));
    let install = |installs: Rc<RefCell<u32>>, removed: Rc<RefCell<u32>>| {
        move |signal: ThemeSignal| {
            *installs.borrow_mut() += 1;
            signal.set(false); // sources report the current page value
            Some(Box::new(Source { removed }) as Box<dyn folio_core::ListenerBinding>)
        }
    };

    let mut first = theme.lease_source(install(installs.clone(), removed.clone()));
    let second = theme.lease_source(install(installs.clone(), removed.clone()));
    assert_eq!(*installs.borrow(), 1); // shared
    assert!(!theme.is_dark());
    assert!(theme.has_source());

    first.release();
    first.release();
    assert!(theme.has_source());
    drop(second);
    assert!(!theme.has_source());
    assert_eq!(*removed.borrow(), 1);

    // a later mount attaches a fresh source
    let _third = theme.lease_source(install(installs.clone(), removed.clone()));
    assert_eq!(*installs.borrow(), 2);
}

#[test]
fn declined_theme_source_still_counts_leases() {
    let theme = ThemeSignal::default();
    let lease = theme.lease_source(|_| None);
    assert!(!theme.has_source());
    drop(lease);
    assert!(!theme.has_source());
}
