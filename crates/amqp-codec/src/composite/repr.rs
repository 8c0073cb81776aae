//! Logical / buffered representation with copy-on-write snapshots.
//!
//! A logical value keeps its fields behind an [`Arc`], so [`Logical::fork`]
//! is cheap and the first mutation of a fork clones the fields. The first
//! request for the encoded bytes caches them in `snapshot`; from then on the
//! value is frozen and every mutator panics. Buffered values are frozen from
//! the start: their bytes are the snapshot.

use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use tracing::trace;

use crate::error::Result;

#[derive(Debug, Clone)]
pub(crate) struct Logical<L> {
    value: Arc<L>,
    snapshot: OnceLock<Bytes>,
    size: OnceLock<u32>,
}

impl<L> Logical<L> {
    pub(crate) fn new(value: L) -> Self {
        Self {
            value: Arc::new(value),
            snapshot: OnceLock::new(),
            size: OnceLock::new(),
        }
    }

    pub(crate) fn get(&self) -> &L {
        &self.value
    }

    pub(crate) fn is_frozen(&self) -> bool {
        self.snapshot.get().is_some()
    }

    /// A mutable sibling that shares the fields until either side writes.
    pub(crate) fn fork(&self) -> Self {
        trace!("forked logical value");
        Self {
            value: Arc::clone(&self.value),
            snapshot: OnceLock::new(),
            size: self.size.clone(),
        }
    }

    /// Caches the encoded size computed by `compute`.
    pub(crate) fn size(&self, compute: impl FnOnce(&L) -> Result<u32>) -> Result<u32> {
        if let Some(size) = self.size.get() {
            return Ok(*size);
        }
        let size = compute(&self.value)?;
        Ok(*self.size.get_or_init(|| size))
    }

    /// Returns the cached encoding, producing and caching it on first call.
    pub(crate) fn snapshot(&self, encode: impl FnOnce(&L) -> Result<Bytes>) -> Result<Bytes> {
        if let Some(bytes) = self.snapshot.get() {
            return Ok(bytes.clone());
        }
        let bytes = encode(&self.value)?;
        trace!(len = bytes.len(), "froze logical value");
        Ok(self.snapshot.get_or_init(|| bytes).clone())
    }

    pub(crate) fn cached_snapshot(&self) -> Option<&Bytes> {
        self.snapshot.get()
    }
}

impl<L: Clone> Logical<L> {
    fn make_mut(&mut self) -> &mut L {
        self.size = OnceLock::new();
        Arc::make_mut(&mut self.value)
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Repr<L, B> {
    Logical(Logical<L>),
    Buffered(B),
}

impl<L, B> Repr<L, B> {
    pub(crate) fn logical(value: L) -> Self {
        Repr::Logical(Logical::new(value))
    }

    pub(crate) fn is_frozen(&self) -> bool {
        match self {
            Repr::Logical(logical) => logical.is_frozen(),
            Repr::Buffered(_) => true,
        }
    }

    pub(crate) fn is_buffered(&self) -> bool {
        matches!(self, Repr::Buffered(_))
    }
}

impl<L: Clone, B> Repr<L, B> {
    /// Mutable access to the logical fields.
    ///
    /// # Panics
    ///
    /// Panics if the value is frozen: it was decoded, or its encoding has
    /// been produced.
    pub(crate) fn make_mut(&mut self, type_name: &'static str) -> &mut L {
        match self {
            Repr::Logical(logical) if !logical.is_frozen() => logical.make_mut(),
            _ => panic!("{type_name} is frozen once encoded or decoded; call copy() to get a mutable value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_shares_until_write() {
        let mut original: Repr<Vec<u8>, ()> = Repr::logical(vec![1, 2]);
        let Repr::Logical(logical) = &original else {
            unreachable!()
        };
        let mut fork = Repr::<Vec<u8>, ()>::Logical(logical.fork());
        fork.make_mut("test").push(3);
        original.make_mut("test").push(4);
        let (Repr::Logical(a), Repr::Logical(b)) = (&original, &fork) else {
            unreachable!()
        };
        assert_eq!(a.get(), &vec![1, 2, 4]);
        assert_eq!(b.get(), &vec![1, 2, 3]);
    }

    #[test]
    fn snapshot_is_cached_and_freezes() {
        let logical = Logical::new(7u8);
        let first = logical.snapshot(|v| Ok(Bytes::from(vec![*v]))).unwrap();
        let second = logical.snapshot(|_| unreachable!()).unwrap();
        assert_eq!(first, second);
        assert!(logical.is_frozen());
        assert!(!logical.fork().is_frozen());
    }

    #[test]
    #[should_panic(expected = "call copy()")]
    fn frozen_rejects_mutation() {
        let mut repr: Repr<u8, ()> = Repr::logical(1);
        if let Repr::Logical(logical) = &repr {
            logical.snapshot(|_| Ok(Bytes::new())).unwrap();
        }
        *repr.make_mut("test") = 2;
    }

    #[test]
    #[should_panic(expected = "frozen")]
    fn buffered_rejects_mutation() {
        let mut repr: Repr<u8, ()> = Repr::Buffered(());
        repr.make_mut("test");
    }
}
