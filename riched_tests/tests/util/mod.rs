// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Utility functions and types shared across tests.

mod failing_alloc;

pub(crate) use failing_alloc::fail_large_allocations;
pub(crate) use riched_dev::{pt, utf16, TestEnv};

use riched::{DocInitArg, WrapMode};

/// A document wrapping `text` at spaces, with advances of 10 and a viewport 50 wide.
pub(crate) fn narrow_env(name: &str, text: &str) -> TestEnv {
    let mut arg = DocInitArg {
        wrap_mode: WrapMode::SpaceOnly,
        ..DocInitArg::default()
    };
    arg.default_style.size = 20.0;
    let mut env = TestEnv::with_arg(name, arg);
    env.resize(50.0, 1000.0);
    env.insert(pt(0, 0), text);
    env.layout();
    env.events();
    env
}

/// Returns the current function name (for use in test naming).
#[macro_export]
macro_rules! test_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = &name[..name.len() - 3];
        let name = &name[name.rfind(':').map(|x| x + 1).unwrap_or(0)..];

        name
    }};
}
