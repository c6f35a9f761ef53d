use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::reactive::{self, ObserverId, SignalId};

pub type SubId = usize;

/// Observable state cell.
///
/// Reads through `get`/`with` are recorded against whatever is rendering;
/// writes queue those readers for the next frame and return immediately.
pub struct Signal<T>(Rc<Inner<T>>);

struct Inner<T> {
    id: SignalId,
    name: Option<Cow<'static, str>>,
    value: RefCell<T>,
    subs: RefCell<Vec<Box<dyn Fn(&T)>>>,
    // Set for derived signals: the observer that recomputes this value.
    owner: Cell<Option<ObserverId>>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if let Some(obs) = self.owner.take() {
            reactive::remove_observer(obs);
        }
        reactive::drop_signal(self.id);
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Signal");
        if let Some(name) = &self.0.name {
            d.field("name", name);
        }
        match self.0.value.try_borrow() {
            Ok(v) => d.field("value", &*v),
            Err(_) => d.field("value", &"<borrowed>"),
        };
        d.finish()
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self::build(None, value)
    }

    pub fn named(name: impl Into<Cow<'static, str>>, value: T) -> Self {
        Self::build(Some(name.into()), value)
    }

    fn build(name: Option<Cow<'static, str>>, value: T) -> Self {
        Self(Rc::new(Inner {
            id: reactive::new_signal_id(),
            name,
            value: RefCell::new(value),
            subs: RefCell::new(Vec::new()),
            owner: Cell::new(None),
        }))
    }

    pub fn id(&self) -> SignalId {
        self.0.id
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        reactive::register_signal_read(self.0.id);
        self.0.value.borrow().clone()
    }

    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.0.value.borrow().clone()
    }

    /// Borrow the value without cloning it. Tracked like `get`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        reactive::register_signal_read(self.0.id);
        f(&self.0.value.borrow())
    }

    pub fn set(&self, v: T) {
        *self.0.value.borrow_mut() = v;
        self.notify();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.value.borrow_mut());
        self.notify();
    }

    /// Writes only if the value differs. Returns whether it was written.
    pub fn set_if_changed(&self, v: T) -> bool
    where
        T: PartialEq,
    {
        if *self.0.value.borrow() == v {
            return false;
        }
        self.set(v);
        true
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        self.0.subs.borrow_mut().push(Box::new(f));
        self.0.subs.borrow().len() - 1
    }

    pub fn downgrade(&self) -> WeakSignal<T> {
        WeakSignal(Rc::downgrade(&self.0))
    }

    pub(crate) fn set_owner(&self, obs: ObserverId) {
        self.0.owner.set(Some(obs));
    }

    fn notify(&self) {
        if let Some(name) = &self.0.name {
            log::trace!("signal '{name}' changed");
        }
        {
            let value = self.0.value.borrow();
            for s in self.0.subs.borrow().iter() {
                s(&value);
            }
        }
        reactive::signal_changed(self.0.id);
    }
}

/// Non-owning handle; see [`Signal::downgrade`].
pub struct WeakSignal<T>(Weak<Inner<T>>);

impl<T> Clone for WeakSignal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> WeakSignal<T> {
    pub fn upgrade(&self) -> Option<Signal<T>> {
        self.0.upgrade().map(Signal)
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}

pub fn signal_named<T>(name: impl Into<Cow<'static, str>>, t: T) -> Signal<T> {
    Signal::named(name, t)
}
