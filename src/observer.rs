use chrono::DateTime;
use std::rc::Rc;

use crate::zone::Zone;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatePickerEventKind {
    /// A day was picked from the calendar or typed into the text field.
    DateSelected,
    /// Only the time of day of the selection changed.
    TimeChanged,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DatePickerEvent {
    kind: DatePickerEventKind,
    date: DateTime<Zone>,
}

impl DatePickerEvent {
    pub fn new(kind: DatePickerEventKind, date: DateTime<Zone>) -> Self {
        DatePickerEvent { kind, date }
    }

    pub fn kind(&self) -> DatePickerEventKind {
        self.kind
    }

    pub fn date(&self) -> &DateTime<Zone> {
        &self.date
    }
}

pub trait DatePickerObserver {
    fn on_date_picker_event(&self, event: &DatePickerEvent);
}

impl<F: Fn(&DatePickerEvent)> DatePickerObserver for F {
    fn on_date_picker_event(&self, event: &DatePickerEvent) {
        self(event)
    }
}

/// Subscribers of a picker, notified in registration order.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Rc<dyn DatePickerObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        ObserverRegistry::default()
    }

    fn same(a: &Rc<dyn DatePickerObserver>, b: &Rc<dyn DatePickerObserver>) -> bool {
        // Compare data pointers only, vtable pointers are not unique
        Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
    }

    pub fn contains(&self, observer: &Rc<dyn DatePickerObserver>) -> bool {
        self.observers.iter().any(|o| Self::same(o, observer))
    }

    /// Returns `false` if the observer was registered already.
    pub fn subscribe(&mut self, observer: Rc<dyn DatePickerObserver>) -> bool {
        if self.contains(&observer) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Returns `false` if the observer was not registered.
    pub fn unsubscribe(&mut self, observer: &Rc<dyn DatePickerObserver>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !Self::same(o, observer));
        before != self.observers.len()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&self, event: &DatePickerEvent) {
        for observer in &self.observers {
            observer.on_date_picker_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    fn event() -> DatePickerEvent {
        let date = Zone::utc().with_ymd_and_hms(2024, 2, 14, 12, 0, 0).unwrap();
        DatePickerEvent::new(DatePickerEventKind::DateSelected, date)
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ObserverRegistry::new();

        for name in &["first", "second", "third"] {
            let log = log.clone();
            let name = *name;
            registry.subscribe(Rc::new(move |_: &DatePickerEvent| log.borrow_mut().push(name)));
        }

        registry.notify(&event());

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn duplicate_subscription_is_noop() {
        let count = Rc::new(RefCell::new(0));
        let counter = count.clone();
        let observer: Rc<dyn DatePickerObserver> =
            Rc::new(move |_: &DatePickerEvent| *counter.borrow_mut() += 1);

        let mut registry = ObserverRegistry::new();
        assert!(registry.subscribe(observer.clone()));
        assert!(!registry.subscribe(observer.clone()));
        assert_eq!(registry.len(), 1);

        registry.notify(&event());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn unsubscribe_non_member_is_noop() {
        let a: Rc<dyn DatePickerObserver> = Rc::new(|_: &DatePickerEvent| {});
        let b: Rc<dyn DatePickerObserver> = Rc::new(|_: &DatePickerEvent| {});

        let mut registry = ObserverRegistry::new();
        registry.subscribe(a.clone());

        assert!(!registry.unsubscribe(&b));
        assert_eq!(registry.len(), 1);
        assert!(registry.unsubscribe(&a));
        assert!(registry.is_empty());
        assert!(!registry.unsubscribe(&a));
    }
}
