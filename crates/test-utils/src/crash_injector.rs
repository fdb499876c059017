//! Crash injection for commit-path testing.
//!
//! [`CrashingBackend`] wraps any [`StorageBackend`] and consults a shared
//! [`CrashInjector`] on every snapshot write. Once armed, the injector fails
//! the write at the configured [`CrashPoint`], so tests can check that a
//! failed commit is never half-applied.
//!
//! # Crash Points
//!
//! ```text
//! commit() → write_snapshot ──────────────┐
//!           ↑                             ↑
//!     BeforeWrite                    AfterWrite
//! ```

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
};

use ramdisk_store::{Error, Result, StorageBackend};

/// Points in the commit path where a crash can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrashPoint {
    /// The snapshot never reaches storage.
    ///
    /// Recovery must see the previous commit.
    BeforeWrite,

    /// The snapshot is stored but the commit reports failure.
    ///
    /// Recovery sees the new commit; the live database keeps the old one.
    AfterWrite,
}

/// Tracks crash injection state for deterministic crash simulation.
///
/// All state is atomic, making `CrashInjector` safe to share across threads.
#[derive(Debug)]
pub struct CrashInjector {
    /// The crash point to trigger.
    crash_point: CrashPoint,
    /// Writes observed since arming.
    write_count: AtomicU32,
    /// Writes to let through before crashing.
    writes_before_crash: AtomicU32,
    /// Whether the crash has been triggered.
    crashed: AtomicBool,
    /// Whether injection is armed (enabled).
    armed: AtomicBool,
}

impl CrashInjector {
    /// Creates a new, disarmed crash injector targeting the specified point.
    pub fn new(crash_point: CrashPoint) -> Arc<Self> {
        Arc::new(Self {
            crash_point,
            write_count: AtomicU32::new(0),
            writes_before_crash: AtomicU32::new(0),
            crashed: AtomicBool::new(false),
            armed: AtomicBool::new(false),
        })
    }

    /// Arms the injector to crash on the next write.
    ///
    /// The injector starts disarmed to allow setup commits without
    /// interference.
    pub fn arm(&self) {
        self.arm_after(0);
    }

    /// Arms the injector to let `writes` writes succeed, then crash.
    pub fn arm_after(&self, writes: u32) {
        self.write_count.store(0, Ordering::SeqCst);
        self.writes_before_crash.store(writes, Ordering::SeqCst);
        self.crashed.store(false, Ordering::SeqCst);
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Disarms the injector.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    /// Checks if the crash has been triggered.
    pub fn has_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    /// Returns the configured crash point.
    pub fn crash_point(&self) -> CrashPoint {
        self.crash_point
    }

    /// Returns the number of writes observed since arming.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Records a write and returns true if it should crash.
    fn on_write(&self) -> bool {
        if !self.armed.load(Ordering::SeqCst) || self.crashed.load(Ordering::SeqCst) {
            return false;
        }
        let count = self.write_count.fetch_add(1, Ordering::SeqCst);
        let should_crash = count >= self.writes_before_crash.load(Ordering::SeqCst);
        if should_crash {
            self.crashed.store(true, Ordering::SeqCst);
        }
        should_crash
    }
}

/// Storage backend that fails writes on demand.
pub struct CrashingBackend<B> {
    inner: B,
    injector: Arc<CrashInjector>,
}

impl<B: StorageBackend> CrashingBackend<B> {
    /// Wraps `inner`, consulting `injector` on every write.
    pub fn new(inner: B, injector: Arc<CrashInjector>) -> Self {
        Self { inner, injector }
    }

    /// Returns the wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

fn injected_crash() -> Error {
    Error::Io { source: io::Error::other("injected crash") }
}

impl<B: StorageBackend> StorageBackend for CrashingBackend<B> {
    fn read_snapshot(&self) -> Result<Option<Vec<u8>>> {
        self.inner.read_snapshot()
    }

    fn write_snapshot(&self, snapshot: &[u8], durable: bool) -> Result<()> {
        if !self.injector.on_write() {
            return self.inner.write_snapshot(snapshot, durable);
        }
        match self.injector.crash_point() {
            CrashPoint::BeforeWrite => Err(injected_crash()),
            CrashPoint::AfterWrite => {
                self.inner.write_snapshot(snapshot, durable)?;
                Err(injected_crash())
            },
        }
    }

    fn snapshot_size(&self) -> Result<u64> {
        self.inner.snapshot_size()
    }
}
