// Copyright 2026 the RichED Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable tables that consult the platform when an allocation fails.

use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut, Range};

use crate::{Error, OomAction, Platform};

/// Runs `alloc` until it succeeds or the platform's out-of-memory policy gives up.
pub(crate) fn retry_alloc<P: Platform + ?Sized>(
    platform: &mut P,
    mut alloc: impl FnMut() -> Result<(), TryReserveError>,
) -> Result<(), Error> {
    let mut retry = 0_u32;
    loop {
        match alloc() {
            Ok(()) => return Ok(()),
            Err(err) => {
                tracing::warn!(retry, %err, "allocation failed");
                match platform.on_out_of_memory(retry) {
                    OomAction::Retry => retry = retry.saturating_add(1),
                    OomAction::Ignore => {
                        tracing::warn!(retry, "allocation abandoned");
                        return Err(Error::out_of_memory());
                    }
                }
            }
        }
    }
}

/// A growable table whose growth goes through [`retry_alloc`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LineBuffer<T> {
    items: Vec<T>,
}

impl<T> Default for LineBuffer<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> LineBuffer<T> {
    /// Makes room for `additional` more entries.
    pub(crate) fn reserve<P: Platform + ?Sized>(
        &mut self,
        platform: &mut P,
        additional: usize,
    ) -> Result<(), Error> {
        let items = &mut self.items;
        retry_alloc(platform, || items.try_reserve(additional))
    }

    /// Appends an entry after reserving room for it.
    pub(crate) fn push<P: Platform + ?Sized>(
        &mut self,
        platform: &mut P,
        value: T,
    ) -> Result<(), Error> {
        self.reserve(platform, 1)?;
        self.items.push(value);
        Ok(())
    }

    /// Appends an entry without consulting any out-of-memory policy.
    pub(crate) fn try_push(&mut self, value: T) -> Result<(), Error> {
        self.items
            .try_reserve(1)
            .map_err(|_| Error::out_of_memory())?;
        self.items.push(value);
        Ok(())
    }

    /// Inserts entries at `index`, shifting later entries back.
    pub(crate) fn insert_many<P: Platform + ?Sized>(
        &mut self,
        platform: &mut P,
        index: usize,
        values: impl ExactSizeIterator<Item = T>,
    ) -> Result<(), Error> {
        self.reserve(platform, values.len())?;
        self.items.splice(index..index, values);
        Ok(())
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub(crate) fn remove_range(&mut self, range: Range<usize>) {
        self.items.drain(range);
    }
}

impl<T> Deref for LineBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> DerefMut for LineBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.items
    }
}
