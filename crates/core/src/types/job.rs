use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named counters returned by the keyed job statistics query.
pub type JobStats = BTreeMap<String, u64>;

/// Number of values in a positional job info reply.
pub const JOB_INFO_LEN: usize = 12;

/// Type of a background job, mirroring libvirt's `virDomainJobType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// No job is active.
    #[default]
    None,
    /// Job with a finite completion time.
    Bounded,
    /// Job without a finite completion time, such as a live migration.
    Unbounded,
    Completed,
    Failed,
    Cancelled,
    /// A job type newer than this crate, carried through unchanged.
    Other(u64),
}

impl JobKind {
    pub fn from_raw(raw: u64) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::Bounded,
            2 => Self::Unbounded,
            3 => Self::Completed,
            4 => Self::Failed,
            5 => Self::Cancelled,
            other => Self::Other(other),
        }
    }

    pub fn as_raw(self) -> u64 {
        match self {
            Self::None => 0,
            Self::Bounded => 1,
            Self::Unbounded => 2,
            Self::Completed => 3,
            Self::Failed => 4,
            Self::Cancelled => 5,
            Self::Other(raw) => raw,
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Bounded | Self::Unbounded)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Snapshot of a domain's background job at query time.
///
/// Every counter the hypervisor did not report is zero, so the record is
/// always fully populated regardless of which query produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobStatusRecord {
    pub kind: JobKind,

    pub time_elapsed: u64,
    pub time_remaining: u64,
    pub downtime: u64,
    pub setup_time: u64,

    pub data_total: u64,
    pub data_processed: u64,
    pub data_remaining: u64,

    pub memory_total: u64,
    pub memory_processed: u64,
    pub memory_remaining: u64,
    pub memory_constant: u64,
    pub memory_normal: u64,
    pub memory_normal_bytes: u64,
    pub memory_bps: u64,

    pub disk_total: u64,
    pub disk_processed: u64,
    pub disk_remaining: u64,
    pub disk_bps: u64,

    pub comp_cache: u64,
    pub comp_bytes: u64,
    pub comp_pages: u64,
    pub comp_cache_misses: u64,
    pub comp_overflow: u64,
}

impl JobStatusRecord {
    /// Record reported once the domain is gone or shut off after a job.
    pub fn completed() -> Self {
        Self {
            kind: JobKind::Completed,
            ..Self::default()
        }
    }

    /// Builds a record from a keyed statistics reply.
    ///
    /// Keys this crate does not know about are ignored so that newer
    /// hypervisors can report extra counters.
    pub fn from_job_stats(stats: &JobStats) -> Self {
        let mut record = Self::default();
        for (key, &value) in stats {
            let field = match key.as_str() {
                "type" => {
                    record.kind = JobKind::from_raw(value);
                    continue;
                }
                "time_elapsed" => &mut record.time_elapsed,
                "time_remaining" => &mut record.time_remaining,
                "downtime" => &mut record.downtime,
                "setup_time" => &mut record.setup_time,
                "data_total" => &mut record.data_total,
                "data_processed" => &mut record.data_processed,
                "data_remaining" => &mut record.data_remaining,
                "memory_total" => &mut record.memory_total,
                "memory_processed" => &mut record.memory_processed,
                "memory_remaining" => &mut record.memory_remaining,
                "memory_constant" => &mut record.memory_constant,
                "memory_normal" => &mut record.memory_normal,
                "memory_normal_bytes" => &mut record.memory_normal_bytes,
                "memory_bps" => &mut record.memory_bps,
                "disk_total" => &mut record.disk_total,
                "disk_processed" => &mut record.disk_processed,
                "disk_remaining" => &mut record.disk_remaining,
                "disk_bps" => &mut record.disk_bps,
                "compression_cache" => &mut record.comp_cache,
                "compression_bytes" => &mut record.comp_bytes,
                "compression_pages" => &mut record.comp_pages,
                "compression_cache_misses" => &mut record.comp_cache_misses,
                "compression_overflow" => &mut record.comp_overflow,
                _ => continue,
            };
            *field = value;
        }
        record
    }

    /// Builds a record from a positional job info reply.
    ///
    /// The legacy call only reports twelve values; everything else stays zero.
    pub fn from_job_info(info: &[u64]) -> Result<Self> {
        let Some(values) = info.get(..JOB_INFO_LEN) else {
            return Err(Error::InvalidJobInfo(format!(
                "expected {JOB_INFO_LEN} values, got {}",
                info.len()
            )));
        };

        Ok(Self {
            kind: JobKind::from_raw(values[0]),
            time_elapsed: values[1],
            time_remaining: values[2],
            data_total: values[3],
            data_processed: values[4],
            data_remaining: values[5],
            memory_total: values[6],
            memory_processed: values[7],
            memory_remaining: values[8],
            disk_total: values[9],
            disk_processed: values[10],
            disk_remaining: values[11],
            ..Self::default()
        })
    }

    pub fn is_active(&self) -> bool {
        self.kind.is_active()
    }

    pub fn is_terminal(&self) -> bool {
        self.kind.is_terminal()
    }

    /// Percentage of `data_total` already transferred.
    pub fn progress_percent(&self) -> Option<u8> {
        if self.data_total == 0 {
            return None;
        }
        let processed = self.data_total.saturating_sub(self.data_remaining);
        let percent = (u128::from(processed) * 100) / u128::from(self.data_total);
        Some(percent.min(100) as u8)
    }
}
