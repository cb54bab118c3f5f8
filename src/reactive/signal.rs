use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, Weak};

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct SignalInner<T> {
    value: RwLock<T>,
    subscribers: Mutex<Vec<(u64, Subscriber<T>)>>,
    next_subscriber: AtomicU64,
}

impl<T> SignalInner<T> {
    fn read(&self) -> RwLockReadGuard<'_, T> {
        self.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribers(&self) -> Vec<Subscriber<T>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect()
    }

    fn notify(&self, value: &T) {
        // Callbacks run without any lock held so they may read the signal again
        for callback in self.subscribers() {
            callback(value);
        }
    }
}

/// A published value that can be read and written from any thread.
///
/// Writes only notify subscribers when the value actually changes. Readers
/// either poll with [`Signal::get`] or register a callback with
/// [`Signal::subscribe`].
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                value: RwLock::new(value),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
            }),
        }
    }

    /// Split into a read-only and a write-only handle.
    pub fn split(self) -> (ReadSignal<T>, WriteSignal<T>) {
        (
            ReadSignal {
                inner: self.inner.clone(),
            },
            WriteSignal { inner: self.inner },
        )
    }

    /// A read-only handle sharing this signal's value.
    pub fn reader(&self) -> ReadSignal<T> {
        ReadSignal {
            inner: self.inner.clone(),
        }
    }

    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.read())
    }
}

impl<T: Send + Sync + 'static> Signal<T> {
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        subscribe(&self.inner, callback)
    }
}

impl<T: Clone> Signal<T> {
    pub fn get(&self) -> T {
        self.inner.read().clone()
    }
}

impl<T: PartialEq + Clone> Signal<T> {
    /// Sets the signal's value, only notifying subscribers if it changed.
    pub fn set(&self, value: T) -> bool {
        set(&self.inner, value)
    }

    /// Updates the value in place, only notifying subscribers if it changed.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        update(&self.inner, f)
    }
}

fn subscribe<T, F>(inner: &Arc<SignalInner<T>>, callback: F) -> Subscription
where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + Sync + 'static,
{
    let id = inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
    inner
        .subscribers
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push((id, Arc::new(callback)));

    let weak: Weak<SignalInner<T>> = Arc::downgrade(inner);
    Subscription {
        release: Some(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .subscribers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|(other, _)| *other != id);
            }
        })),
    }
}

fn set<T: PartialEq + Clone>(inner: &SignalInner<T>, value: T) -> bool {
    let mut guard = inner.value.write().unwrap_or_else(PoisonError::into_inner);
    if *guard == value {
        return false;
    }
    *guard = value.clone();
    drop(guard);
    inner.notify(&value);
    true
}

fn update<T: PartialEq + Clone, F: FnOnce(&mut T)>(inner: &SignalInner<T>, f: F) -> bool {
    let mut guard = inner.value.write().unwrap_or_else(PoisonError::into_inner);
    let old_value = guard.clone();
    f(&mut *guard);
    if *guard == old_value {
        return false;
    }
    let new_value = guard.clone();
    drop(guard);
    inner.notify(&new_value);
    true
}

/// Read-only handle to a signal.
pub struct ReadSignal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> ReadSignal<T> {
    pub fn get(&self) -> T {
        self.inner.read().clone()
    }
}

impl<T> ReadSignal<T> {
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.read())
    }
}

impl<T: Send + Sync + 'static> ReadSignal<T> {
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        subscribe(&self.inner, callback)
    }
}

/// Write-only handle to a signal.
///
/// Deliberately not `Clone`: each published field has exactly one writer.
pub struct WriteSignal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T: PartialEq + Clone> WriteSignal<T> {
    /// Sets the signal's value, only notifying subscribers if it changed.
    pub fn set(&self, value: T) -> bool {
        set(&self.inner, value)
    }

    /// Updates the value in place, only notifying subscribers if it changed.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        update(&self.inner, f)
    }
}

impl<T: Clone> WriteSignal<T> {
    /// Get the current value (useful for read-modify-write patterns)
    pub fn get(&self) -> T {
        self.inner.read().clone()
    }
}

/// Keeps a subscriber registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keep the subscriber registered for the lifetime of the signal.
    pub fn forget(mut self) {
        self.release = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

pub fn create_signal<T>(value: T) -> Signal<T> {
    Signal::new(value)
}
