//! Thread-local resolution stack for cycle detection.

use std::cell::RefCell;

use crate::error::{ResolveError, ResolveResult};

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Guard marking a specifier as in-flight on the current thread.
///
/// Injection application recurses through `lookup`, so a cycle in the
/// declarations would otherwise recurse forever. Entering a specifier that
/// is already on the stack reports the full path instead.
pub(crate) struct StackGuard;

impl StackGuard {
    pub(crate) fn enter(specifier: &str) -> ResolveResult<StackGuard> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|s| s == specifier) {
                let mut path = stack.clone();
                path.push(specifier.to_string());
                return Err(ResolveError::Circular(path));
            }
            stack.push(specifier.to_string());
            Ok(StackGuard)
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
