//! Buffer ownership, the allocation ledger and teardown.
//!
//! Every array handed to the solver is either a borrowed view of host storage
//! or an [`OwnedBuf`] allocated by the bridge. Owned buffers are counted in a
//! per-thread ledger when created, and again when they are released or their
//! storage is transferred to the host, so a balanced ledger proves that every
//! allocation was accounted for exactly once.

use std::cell::Cell;

use tracing::trace;

/// Counts of bridge-owned buffers on the current thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerSnapshot {
    pub allocated: usize,
    pub released: usize,
    pub transferred: usize,
}

impl LedgerSnapshot {
    const ZERO: Self = Self {
        allocated: 0,
        released: 0,
        transferred: 0,
    };

    /// Buffers allocated but neither released nor transferred.
    pub fn outstanding(&self) -> usize {
        self.allocated
            .saturating_sub(self.released)
            .saturating_sub(self.transferred)
    }

    /// Activity between `earlier` and this snapshot.
    pub fn since(&self, earlier: &LedgerSnapshot) -> LedgerSnapshot {
        LedgerSnapshot {
            allocated: self.allocated - earlier.allocated,
            released: self.released - earlier.released,
            transferred: self.transferred - earlier.transferred,
        }
    }
}

thread_local! {
    static LEDGER: Cell<LedgerSnapshot> = const { Cell::new(LedgerSnapshot::ZERO) };
}

fn record(update: impl FnOnce(&mut LedgerSnapshot)) {
    LEDGER.with(|ledger| {
        let mut counts = ledger.get();
        update(&mut counts);
        ledger.set(counts);
    });
}

/// Current ledger counts for this thread.
pub fn ledger_snapshot() -> LedgerSnapshot {
    LEDGER.with(Cell::get)
}

/// Who frees a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Allocated by the bridge, released in teardown.
    Owned,
    /// Host storage, never released by the bridge.
    Borrowed,
}

/// Heap buffer allocated by the bridge.
#[derive(Debug)]
pub struct OwnedBuf<T> {
    data: Vec<T>,
    transferred: bool,
}

impl<T> OwnedBuf<T> {
    pub fn from_vec(data: Vec<T>) -> Self {
        record(|counts| counts.allocated += 1);
        Self {
            data,
            transferred: false,
        }
    }

    pub fn zeroed(len: usize) -> Self
    where
        T: Default + Clone,
    {
        Self::from_vec(vec![T::default(); len])
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }

    /// Offers the storage to `convert`. On success the buffer counts as
    /// transferred; otherwise the storage is put back and the buffer returned.
    pub fn try_transfer<U>(
        mut self,
        convert: impl FnOnce(Vec<T>) -> Result<U, Vec<T>>,
    ) -> Result<U, Self> {
        let data = std::mem::take(&mut self.data);
        match convert(data) {
            Ok(converted) => {
                self.transferred = true;
                record(|counts| counts.transferred += 1);
                Ok(converted)
            }
            Err(data) => {
                self.data = data;
                Err(self)
            }
        }
    }
}

impl<T> Drop for OwnedBuf<T> {
    fn drop(&mut self) {
        if !self.transferred {
            record(|counts| counts.released += 1);
        }
    }
}

/// Array passed to the solver: a host alias or a bridge-owned copy.
#[derive(Debug)]
pub enum Buffer<'a, T> {
    Borrowed(&'a [T]),
    Owned(OwnedBuf<T>),
}

impl<T> Buffer<'_, T> {
    pub fn ownership(&self) -> Ownership {
        match self {
            Buffer::Borrowed(_) => Ownership::Borrowed,
            Buffer::Owned(_) => Ownership::Owned,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Buffer::Borrowed(slice) => slice,
            Buffer::Owned(buf) => buf.as_slice(),
        }
    }

    pub fn as_ptr(&self) -> *const T {
        self.as_slice().as_ptr()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// One buffer as seen by teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferRecord {
    pub name: &'static str,
    pub ownership: Ownership,
    pub len: usize,
}

impl BufferRecord {
    pub fn new<T>(name: &'static str, buffer: &Buffer<'_, T>) -> Self {
        Self {
            name,
            ownership: buffer.ownership(),
            len: buffer.len(),
        }
    }

    pub fn owned<T>(name: &'static str, buffer: &OwnedBuf<T>) -> Self {
        Self {
            name,
            ownership: Ownership::Owned,
            len: buffer.len(),
        }
    }
}

/// A marshalled component that holds buffers.
pub trait TrackedBuffers {
    fn buffer_records(&self) -> Vec<BufferRecord>;
}

/// What teardown did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub released: Vec<&'static str>,
    pub borrowed: Vec<&'static str>,
}

impl TeardownReport {
    /// Walks the component's buffers by ownership tag, then drops it, which
    /// releases exactly the owned ones. Absent components are skipped.
    pub fn absorb<T: TrackedBuffers>(&mut self, component: Option<T>) {
        let Some(component) = component else {
            return;
        };
        for record in component.buffer_records() {
            match record.ownership {
                Ownership::Owned => {
                    trace!(
                        component = "bridge",
                        operation = "teardown",
                        buffer = record.name,
                        len = record.len,
                        "Releasing owned buffer"
                    );
                    self.released.push(record.name);
                }
                Ownership::Borrowed => self.borrowed.push(record.name),
            }
        }
        drop(component);
    }
}
