// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

mod audit_log;

pub use audit_log::{AuditLog, LogEntry, LogFilter, LogLevel, PerformanceSample, DEFAULT_CAPACITY};
