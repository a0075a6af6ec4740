//! Lifecycle and identifier bookkeeping shared by the backend shims.

use std::hash::Hash;

use parking_lot::RwLock;

use super::error::{ErrorContext, ViewerError, ViewerResult};
use super::id_map::IdentifierMap;
use super::protocol::ModelSourceKind;
use crate::models::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Created,
    Loading,
    Ready,
    Disposed,
}

/// State every shim carries: where it is in its lifecycle and its id table.
#[derive(Debug)]
pub(crate) struct ShimCore<N> {
    kind: ModelSourceKind,
    lifecycle: RwLock<Lifecycle>,
    ids: RwLock<IdentifierMap<N>>,
}

impl<N: Clone + Eq + Hash> ShimCore<N> {
    pub(crate) fn new(kind: ModelSourceKind) -> Self {
        Self {
            kind,
            lifecycle: RwLock::new(Lifecycle::Created),
            ids: RwLock::new(IdentifierMap::new()),
        }
    }

    pub(crate) fn context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation).with_backend(self.kind)
    }

    pub(crate) fn is_ready(&self) -> bool {
        *self.lifecycle.read() == Lifecycle::Ready
    }

    /// Move to `Loading`; fails once disposed.
    pub(crate) fn begin_load(&self, operation: &str) -> ViewerResult<()> {
        let mut lifecycle = self.lifecycle.write();
        if *lifecycle == Lifecycle::Disposed {
            return Err(ViewerError::disposed(self.context(operation)));
        }
        *lifecycle = Lifecycle::Loading;
        Ok(())
    }

    /// Install the identifier table and mark the adapter ready.
    ///
    /// Fails if the adapter was disposed while the load was in flight.
    pub(crate) fn finish_load<I>(&self, operation: &str, pairs: I) -> ViewerResult<usize>
    where
        I: IntoIterator<Item = (ElementId, N)>,
    {
        let mut lifecycle = self.lifecycle.write();
        if *lifecycle == Lifecycle::Disposed {
            return Err(ViewerError::disposed(self.context(operation)));
        }
        let count = self.ids.write().rebuild(pairs);
        *lifecycle = Lifecycle::Ready;
        log::info!("{} viewer ready with {} mapped elements", self.kind, count);
        Ok(count)
    }

    /// Fall back to `Created` after a failed load.
    pub(crate) fn abort_load(&self) {
        let mut lifecycle = self.lifecycle.write();
        if *lifecycle == Lifecycle::Loading {
            *lifecycle = Lifecycle::Created;
        }
    }

    pub(crate) fn ensure_ready(&self, operation: &str) -> ViewerResult<()> {
        match *self.lifecycle.read() {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Disposed => Err(ViewerError::disposed(self.context(operation))),
            Lifecycle::Created | Lifecycle::Loading => {
                Err(ViewerError::not_ready(self.context(operation)))
            }
        }
    }

    /// Check readiness, then resolve `ids` against the table.
    pub(crate) fn resolve(
        &self,
        operation: &str,
        ids: &[ElementId],
    ) -> ViewerResult<(Vec<N>, Vec<ElementId>)> {
        self.ensure_ready(operation)?;
        let (native, skipped) = self.ids.read().resolve(ids);
        if !skipped.is_empty() {
            log::debug!(
                "{} {}: {} ids not in model, skipped",
                self.kind,
                operation,
                skipped.len()
            );
        }
        Ok((native, skipped))
    }

    /// Native id of one element, if mapped.
    pub(crate) fn lookup(&self, id: &ElementId) -> Option<N> {
        self.ids.read().native(id).cloned()
    }

    pub(crate) fn all_natives(&self) -> Vec<N> {
        self.ids.read().natives().cloned().collect()
    }

    pub(crate) fn mapped_count(&self) -> usize {
        self.ids.read().len()
    }

    /// Clear the table and mark disposed. Returns false if already disposed.
    pub(crate) fn mark_disposed(&self) -> bool {
        let mut lifecycle = self.lifecycle.write();
        if *lifecycle == Lifecycle::Disposed {
            return false;
        }
        *lifecycle = Lifecycle::Disposed;
        self.ids.write().clear();
        true
    }
}

/// Map a native client failure into a [`ViewerError::Native`].
pub(crate) fn native_error(context: ErrorContext, err: anyhow::Error) -> ViewerError {
    ViewerError::native(format!("{:#}", err), context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        let core: ShimCore<u32> = ShimCore::new(ModelSourceKind::OpenFormat);
        assert!(matches!(
            core.ensure_ready("show_objects"),
            Err(ViewerError::NotReady { .. })
        ));

        core.begin_load("initialize").unwrap();
        core.finish_load("initialize", vec![(ElementId::new("a"), 1)]).unwrap();
        assert!(core.is_ready());
        assert_eq!(core.mapped_count(), 1);

        assert!(core.mark_disposed());
        assert!(!core.mark_disposed());
        assert_eq!(core.mapped_count(), 0);
        assert!(matches!(
            core.resolve("show_objects", &[ElementId::new("a")]),
            Err(ViewerError::Disposed { .. })
        ));
        assert!(core.begin_load("initialize").is_err());
    }

    #[test]
    fn test_abort_load_returns_to_created() {
        let core: ShimCore<u32> = ShimCore::new(ModelSourceKind::MeshStream);
        core.begin_load("initialize").unwrap();
        core.abort_load();
        assert!(!core.is_ready());
        assert!(core.begin_load("initialize").is_ok());
    }
}
