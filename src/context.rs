// Copyright Sebastian Wiesner <sebastian@swsnr.de>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A request-scoped carrier of values.

use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

thread_local! {
    static CURRENT: RefCell<Context> = RefCell::new(Context::background());
}

struct Entry {
    key: Cow<'static, str>,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// An immutable set of keyed values threaded through a call chain.
///
/// Deriving a context with [`Context::with_value`] never changes the parent,
/// and clones share all entries, so a context can be handed to other threads
/// and read concurrently.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self { head: None }
    }

    /// Derive a new context which additionally carries `value` under `key`.
    ///
    /// A later value shadows an earlier one with the same key.
    pub fn with_value<K, T>(&self, key: K, value: T) -> Self
    where
        K: Into<Cow<'static, str>>,
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Entry {
                key: key.into(),
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Get the value stored under `key`, if it is a `T`.
    ///
    /// Only the newest entry for `key` is considered; if it holds a value of
    /// another type return `None`.
    pub fn value<T: Any>(&self, key: &str) -> Option<&T> {
        let mut entry = self.head.as_deref();
        while let Some(current) = entry {
            if current.key == key {
                return current.value.downcast_ref();
            }
            entry = current.parent.as_deref();
        }
        None
    }

    /// Whether this context and `other` share the very same entries.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// The context entered on the current thread.
    ///
    /// Return the background context if no context was entered.
    pub fn current() -> Self {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Make this context the current context of this thread.
    ///
    /// The previous context becomes current again when the returned guard
    /// is dropped.
    pub fn enter(&self) -> ContextGuard {
        let previous = CURRENT.with(|current| current.replace(self.clone()));
        ContextGuard { previous }
    }

    /// Run `f` with this context entered on the current thread.
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        f()
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::successors(self.head.as_deref(), |entry| entry.parent.as_deref())
            .map(|entry| entry.key.as_ref())
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Restores the previously current context when dropped.
///
/// See [`Context::enter`].
#[must_use = "the context is left immediately if the guard is not held"]
pub struct ContextGuard {
    previous: Context,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = std::mem::take(&mut self.previous);
        CURRENT.with(|current| current.replace(previous));
    }
}
