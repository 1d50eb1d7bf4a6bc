// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Bounded audit trail of link graph activity.
//!
//! Every mutating graph operation appends a [`LogEntry`]. The log is a ring
//! buffer: once `capacity` entries are held, the oldest is evicted. Each entry
//! is mirrored to `tracing` at its own level so the same information reaches
//! the process log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::core::ids::{ChainId, DependencyId};

/// Default number of entries retained.
pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Timing attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_id: Option<DependencyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSample>,
}

impl LogEntry {
    /// Start an entry; `id` and `timestamp` are assigned by [`AuditLog::append`].
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            id: 0,
            timestamp: Utc::now(),
            level,
            message: message.into(),
            component_id: None,
            dependency_id: None,
            chain_id: None,
            data_type: None,
            performance: None,
        }
    }

    pub fn component(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = Some(component_id.into());
        self
    }

    pub fn dependency(mut self, dependency_id: &DependencyId) -> Self {
        self.dependency_id = Some(dependency_id.clone());
        self
    }

    pub fn chain(mut self, chain_id: &ChainId) -> Self {
        self.chain_id = Some(chain_id.clone());
        self
    }

    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn duration_ms(mut self, duration_ms: f64) -> Self {
        self.performance = Some(PerformanceSample { duration_ms });
        self
    }
}

/// Criteria for [`AuditLog::filtered`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub level: Option<LogLevel>,
    pub component_id: Option<String>,
    pub dependency_id: Option<DependencyId>,
    pub chain_id: Option<ChainId>,
    pub data_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn component(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = Some(component_id.into());
        self
    }

    pub fn dependency(mut self, dependency_id: &DependencyId) -> Self {
        self.dependency_id = Some(dependency_id.clone());
        self
    }

    pub fn chain(mut self, chain_id: &ChainId) -> Self {
        self.chain_id = Some(chain_id.clone());
        self
    }

    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        fn field_matches<T: PartialEq>(want: &Option<T>, have: &Option<T>) -> bool {
            match want {
                Some(w) => have.as_ref() == Some(w),
                None => true,
            }
        }

        self.level.is_none_or(|level| entry.level == level)
            && field_matches(&self.component_id, &entry.component_id)
            && field_matches(&self.dependency_id, &entry.dependency_id)
            && field_matches(&self.chain_id, &entry.chain_id)
            && field_matches(&self.data_type, &entry.data_type)
            && self.from.is_none_or(|from| entry.timestamp >= from)
            && self.to.is_none_or(|to| entry.timestamp <= to)
    }
}

#[derive(Debug)]
pub struct AuditLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
            next_id: 1,
        }
    }

    /// Append an entry, evicting the oldest when full. Returns the stored entry.
    pub fn append(&mut self, mut entry: LogEntry) -> LogEntry {
        entry.id = self.next_id;
        self.next_id += 1;
        entry.timestamp = Utc::now();

        trace_entry(&entry);

        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        entry
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn filtered(&self, filter: &LogFilter) -> Vec<&LogEntry> {
        self.entries.iter().filter(|e| filter.matches(e)).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

fn trace_entry(entry: &LogEntry) {
    let component = entry.component_id.as_deref().unwrap_or("-");
    let dependency = entry.dependency_id.as_deref().unwrap_or("-");
    let chain = entry.chain_id.as_deref().unwrap_or("-");
    match entry.level {
        LogLevel::Debug => tracing::debug!(component, dependency, chain, "{}", entry.message),
        LogLevel::Info => tracing::info!(component, dependency, chain, "{}", entry.message),
        LogLevel::Warn => tracing::warn!(component, dependency, chain, "{}", entry.message),
        LogLevel::Error => tracing::error!(component, dependency, chain, "{}", entry.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut log = AuditLog::with_capacity(3);
        for i in 0..5 {
            log.append(LogEntry::new(LogLevel::Info, format!("entry {}", i)));
        }

        assert_eq!(log.len(), 3);
        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["entry 2", "entry 3", "entry 4"]);
        let ids: Vec<_> = log.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn test_default_capacity_is_one_thousand() {
        let mut log = AuditLog::new();
        for i in 0..1005 {
            log.append(LogEntry::new(LogLevel::Debug, format!("{}", i)));
        }
        assert_eq!(log.len(), 1000);
        assert_eq!(log.entries().next().map(|e| e.message.as_str()), Some("5"));
    }

    #[test]
    fn test_filter_by_fields() {
        let mut log = AuditLog::new();
        let dep = DependencyId::from("dep_a");
        log.append(
            LogEntry::new(LogLevel::Info, "created")
                .component("emailList")
                .dependency(&dep),
        );
        log.append(
            LogEntry::new(LogLevel::Warn, "cycle")
                .component("emailDetail")
                .data_type("EMAIL_DATA"),
        );
        log.append(LogEntry::new(LogLevel::Info, "other").component("emailDetail"));

        assert_eq!(log.filtered(&LogFilter::new().level(LogLevel::Warn)).len(), 1);
        assert_eq!(log.filtered(&LogFilter::new().component("emailDetail")).len(), 2);
        assert_eq!(log.filtered(&LogFilter::new().dependency(&dep)).len(), 1);
        assert_eq!(
            log.filtered(&LogFilter::new().component("emailDetail").level(LogLevel::Info))
                .len(),
            1
        );
        assert_eq!(log.filtered(&LogFilter::new().data_type("FOLDER_DATA")).len(), 0);
    }

    #[test]
    fn test_filter_by_time_window() {
        let mut log = AuditLog::new();
        log.append(LogEntry::new(LogLevel::Info, "early"));
        let after_first = Utc::now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        log.append(LogEntry::new(LogLevel::Info, "late"));

        let late = log.filtered(&LogFilter::new().between(Some(after_first), None));
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].message, "late");

        let early = log.filtered(&LogFilter::new().between(None, Some(after_first)));
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].message, "early");
    }

    #[test]
    fn test_clear() {
        let mut log = AuditLog::new();
        log.append(LogEntry::new(LogLevel::Error, "boom"));
        log.clear();
        assert!(log.is_empty());
    }
}
