//! Build parallelism sizing for the image build.
//!
//! Heavy compilation jobs need roughly 8 GB of RAM each, so the job count is
//! bounded by memory as well as by CPUs. Leftover CPUs are handed to each job
//! as compiler threads, capped at 4 where returns diminish.

use sysinfo::System;

/// Memory budget per concurrent job: 8 decimal gigabytes of the byte count
/// `sysinfo` reports.
///
/// Reading `MemTotal` from `/proc/meminfo` and dividing by 10^6 gives about
/// 2.4% less (the figure is in KiB), so a host within that margin of a
/// multiple of 8 GB gets one job more here than with that estimate.
pub const MEMORY_PER_JOB_BYTES: u64 = 8_000_000_000;

/// Upper bound for per-job compiler threads.
pub const MAX_THREADS_PER_JOB: usize = 4;

/// Concurrency parameters passed to the image build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildParallelism {
    /// Number of concurrent compile jobs (`MAX_JOBS`).
    pub max_jobs: usize,
    /// Threads each job may use (`NVCC_THREADS`).
    pub threads_per_job: usize,
}

impl BuildParallelism {
    /// Size the build for a host with `total_memory_bytes` of RAM and `cpus`
    /// logical CPUs. Both outputs are at least 1.
    pub fn for_host(total_memory_bytes: u64, cpus: usize) -> Self {
        let cpus = cpus.max(1);
        let by_memory = usize::try_from(total_memory_bytes / MEMORY_PER_JOB_BYTES).unwrap_or(usize::MAX);
        let max_jobs = by_memory.max(1).min(cpus);
        let threads_per_job = (cpus / max_jobs).clamp(1, MAX_THREADS_PER_JOB);

        Self {
            max_jobs,
            threads_per_job,
        }
    }

    /// Memory reserved by this plan, in whole gigabytes.
    pub fn reserved_memory_gb(&self) -> u64 {
        self.max_jobs as u64 * (MEMORY_PER_JOB_BYTES / 1_000_000_000)
    }

    /// `KEY=VALUE` build arguments, in the order the image build expects.
    pub fn build_args(&self) -> [String; 2] {
        [
            format!("MAX_JOBS={}", self.max_jobs),
            format!("NVCC_THREADS={}", self.threads_per_job),
        ]
    }
}

/// Total memory in bytes and logical CPU count of this machine.
pub fn detect_host() -> (u64, usize) {
    let mut system = System::new();
    system.refresh_memory();
    (system.total_memory(), num_cpus::get())
}

#[cfg(test)]
mod tests {
    use super::*;

    const GB: u64 = 1_000_000_000;

    #[test]
    fn test_64gb_28_cpus() {
        let plan = BuildParallelism::for_host(64 * GB, 28);
        assert_eq!(plan.max_jobs, 8);
        assert_eq!(plan.threads_per_job, 3);
    }

    #[test]
    fn test_cpu_bound_host() {
        let plan = BuildParallelism::for_host(256 * GB, 4);
        assert_eq!(plan.max_jobs, 4);
        assert_eq!(plan.threads_per_job, 1);
    }

    #[test]
    fn test_small_memory_still_one_job() {
        let plan = BuildParallelism::for_host(2 * GB, 16);
        assert_eq!(plan.max_jobs, 1);
        assert_eq!(plan.threads_per_job, 4);
    }

    #[test]
    fn test_threads_capped() {
        let plan = BuildParallelism::for_host(16 * GB, 64);
        assert_eq!(plan.max_jobs, 2);
        assert_eq!(plan.threads_per_job, MAX_THREADS_PER_JOB);
    }

    #[test]
    fn test_zero_cpus_treated_as_one() {
        let plan = BuildParallelism::for_host(64 * GB, 0);
        assert_eq!(plan.max_jobs, 1);
        assert_eq!(plan.threads_per_job, 1);
    }

    #[test]
    fn test_job_boundary_is_exact_decimal_bytes() {
        assert_eq!(BuildParallelism::for_host(16 * GB - 1, 8).max_jobs, 1);
        assert_eq!(BuildParallelism::for_host(16 * GB, 8).max_jobs, 2);
    }

    #[test]
    fn test_64_gib_host() {
        // MemTotal of 65_536_000 kB.
        let plan = BuildParallelism::for_host(65_536_000 * 1024, 32);
        assert_eq!(plan.max_jobs, 8);
        assert_eq!(plan.threads_per_job, 4);
    }

    #[test]
    fn test_build_args_and_reserved_memory() {
        let plan = BuildParallelism::for_host(64 * GB, 28);
        assert_eq!(plan.build_args(), ["MAX_JOBS=8", "NVCC_THREADS=3"]);
        assert_eq!(plan.reserved_memory_gb(), 64);
    }

    #[test]
    fn test_detect_host_reports_something() {
        let (_memory, cpus) = detect_host();
        assert!(cpus >= 1);
    }
}
