//! Process memory sampling
//!
//! The harness only talks to [`ResourceSampler`]; [`ProcessSampler`] is the
//! sysinfo-backed implementation. Samples are point-in-time readings of the
//! whole process, so a delta between two samples is an approximation: the
//! allocator may reuse pages freed by an earlier iteration, and the OS may not
//! return freed memory at all. Treat deltas as indicative, not exact.

use std::fmt;

use sysinfo::{Pid, System};
use tracing::warn;

/// Resident and virtual memory of the process at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    /// Resident set size in bytes
    pub resident_bytes: u64,
    /// Virtual memory size in bytes
    pub virtual_bytes: u64,
}

impl MemorySample {
    /// Signed change from `before` to `self`
    #[must_use]
    pub fn delta_since(&self, before: &Self) -> MemoryDelta {
        MemoryDelta {
            resident_bytes: signed_diff(self.resident_bytes, before.resident_bytes),
            virtual_bytes: signed_diff(self.virtual_bytes, before.virtual_bytes),
        }
    }
}

/// Memory change attributed to one phase (may be negative)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryDelta {
    /// Change in resident bytes
    pub resident_bytes: i64,
    /// Change in virtual bytes
    pub virtual_bytes: i64,
}

#[allow(clippy::cast_possible_wrap)]
fn signed_diff(after: u64, before: u64) -> i64 {
    if after >= before {
        (after - before) as i64
    } else {
        -((before - after) as i64)
    }
}

/// Source of memory readings, called before and after each measured phase
pub trait ResourceSampler {
    /// Take one reading
    fn sample(&mut self) -> MemorySample;
}

/// Samples the current process through sysinfo
pub struct ProcessSampler {
    system: System,
    pid: Option<Pid>,
}

impl ProcessSampler {
    /// Sampler for the running process
    ///
    /// If the platform cannot report a pid, every sample reads as zero.
    #[must_use]
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(reason) => {
                warn!(reason, "cannot resolve current pid; memory samples will read zero");
                None
            }
        };
        Self {
            system: System::new(),
            pid,
        }
    }
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProcessSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSampler").field("pid", &self.pid).finish()
    }
}

impl ResourceSampler for ProcessSampler {
    fn sample(&mut self) -> MemorySample {
        let Some(pid) = self.pid else {
            return MemorySample::default();
        };
        if !self.system.refresh_process(pid) {
            return MemorySample::default();
        }
        self.system
            .process(pid)
            .map(|process| MemorySample {
                resident_bytes: process.memory(),
                virtual_bytes: process.virtual_memory(),
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_delta_signs() {
        let before = MemorySample {
            resident_bytes: 1_000,
            virtual_bytes: 5_000,
        };
        let after = MemorySample {
            resident_bytes: 1_500,
            virtual_bytes: 4_000,
        };

        let delta = after.delta_since(&before);
        assert_eq!(delta.resident_bytes, 500);
        assert_eq!(delta.virtual_bytes, -1_000);
    }

    #[test]
    #[serial]
    fn test_process_sampler_reports_resident_memory() {
        let mut sampler = ProcessSampler::new();
        let sample = sampler.sample();

        if cfg!(any(target_os = "linux", target_os = "macos", target_os = "windows")) {
            assert!(sample.resident_bytes > 0);
        }
    }
}
