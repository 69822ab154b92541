// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A global allocator that can be told to fail large allocations on the current thread.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::ptr;

/// Allocations at least this large are the ones that can be made to fail.
pub(crate) const LARGE_ALLOCATION: usize = 64 * 1024;

thread_local! {
    static FAILURES_LEFT: Cell<usize> = const { Cell::new(0) };
}

/// Makes the next `count` large allocations on this thread fail.
pub(crate) fn fail_large_allocations(count: usize) {
    FAILURES_LEFT.with(|left| left.set(count));
}

fn should_fail(size: usize) -> bool {
    size >= LARGE_ALLOCATION
        && FAILURES_LEFT
            .try_with(|left| {
                let count = left.get();
                left.set(count.saturating_sub(1));
                count > 0
            })
            .unwrap_or(false)
}

struct FailingAlloc;

#[expect(
    unsafe_code,
    reason = "injecting allocation failures needs a global allocator"
)]
// SAFETY: every method either forwards to `System` with the caller's guarantees or
// returns null, which signals failure to the caller.
unsafe impl GlobalAlloc for FailingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if should_fail(layout.size()) {
            return ptr::null_mut();
        }
        // SAFETY: forwarded unchanged.
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if should_fail(layout.size()) {
            return ptr::null_mut();
        }
        // SAFETY: forwarded unchanged.
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: forwarded unchanged.
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if should_fail(new_size) {
            return ptr::null_mut();
        }
        // SAFETY: forwarded unchanged.
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static ALLOCATOR: FailingAlloc = FailingAlloc;
