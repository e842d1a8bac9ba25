//! Per-thread diagnostic for the most recent engine failure.

use std::cell::RefCell;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Store `message` as the current thread's last error.
pub fn record(message: impl Into<String>) {
    let message = message.into();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

/// Forget the current thread's last error.
pub fn clear() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// The current thread's last error, if any.
pub fn message() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}
