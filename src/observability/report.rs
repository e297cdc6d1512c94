//! Offline analysis of the audit log.
//!
//! Reads the rotating log files written by the file sink and aggregates the
//! audit lines: totals, threats blocked, and a per-client breakdown.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::observability::logging::AUDIT_TARGET;

/// Kind of audit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Allowed,
    Blocked,
    RateLimited,
    Malformed,
}

/// One parsed audit line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// RFC 3339 timestamp as written by the sink.
    pub timestamp: String,
    pub client: String,
    pub kind: EntryKind,
}

impl AuditEntry {
    /// `YYYY-MM-DD` part of the timestamp.
    pub fn date(&self) -> &str {
        self.timestamp.get(..10).unwrap_or(&self.timestamp)
    }
}

/// Inclusive date range, `YYYY-MM-DD` bounds.
#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRange {
    pub fn contains(&self, date: &str) -> bool {
        self.from.as_deref().map_or(true, |from| date >= from)
            && self.to.as_deref().map_or(true, |to| date <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSummary {
    pub client: String,
    pub total_requests: u64,
    pub threats_blocked: u64,
    pub rate_limited: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub total_requests: u64,
    pub allowed: u64,
    pub threats_blocked: u64,
    pub rate_limited: u64,
    pub malformed: u64,
    /// Sorted by request volume, busiest first.
    pub clients: Vec<ClientSummary>,
}

/// Parser for audit lines in the file sink's format.
pub struct AuditLogParser {
    line: Regex,
}

impl AuditLogParser {
    pub fn new() -> Result<Self, regex::Error> {
        let pattern = format!(
            r"^(?P<ts>\S+)\s+(?:INFO|WARN)\s.*?\b{AUDIT_TARGET}: (?P<kind>Allowed|Blocked|Rate limited|Malformed) request from IP (?P<client>\S+?):(?:\s|$)"
        );
        Ok(Self {
            line: Regex::new(&pattern)?,
        })
    }

    pub fn parse_line(&self, line: &str) -> Option<AuditEntry> {
        let caps = self.line.captures(line)?;
        let kind = match &caps["kind"] {
            "Allowed" => EntryKind::Allowed,
            "Blocked" => EntryKind::Blocked,
            "Rate limited" => EntryKind::RateLimited,
            _ => EntryKind::Malformed,
        };
        Some(AuditEntry {
            timestamp: caps["ts"].to_string(),
            client: caps["client"].to_string(),
            kind,
        })
    }

    /// Aggregate every audit line from `reader` inside `range`.
    pub fn summarize<R: BufRead>(&self, reader: R, range: &DateRange) -> io::Result<Report> {
        let mut builder = ReportBuilder::default();
        for line in reader.lines() {
            if let Some(entry) = self.parse_line(&line?) {
                if range.contains(entry.date()) {
                    builder.add(&entry);
                }
            }
        }
        Ok(builder.finish())
    }

    /// Aggregate several log files (e.g. the current file and its rotations).
    pub fn summarize_files<P: AsRef<Path>>(&self, paths: &[P], range: &DateRange) -> io::Result<Report> {
        let mut builder = ReportBuilder::default();
        for path in paths {
            let reader = BufReader::new(File::open(path)?);
            for line in reader.lines() {
                if let Some(entry) = self.parse_line(&line?) {
                    if range.contains(entry.date()) {
                        builder.add(&entry);
                    }
                }
            }
        }
        Ok(builder.finish())
    }
}

#[derive(Default)]
struct ReportBuilder {
    allowed: u64,
    blocked: u64,
    rate_limited: u64,
    malformed: u64,
    clients: HashMap<String, ClientSummary>,
}

impl ReportBuilder {
    fn add(&mut self, entry: &AuditEntry) {
        let client = self
            .clients
            .entry(entry.client.clone())
            .or_insert_with(|| ClientSummary {
                client: entry.client.clone(),
                total_requests: 0,
                threats_blocked: 0,
                rate_limited: 0,
            });
        client.total_requests += 1;

        match entry.kind {
            EntryKind::Allowed => self.allowed += 1,
            EntryKind::Blocked => {
                self.blocked += 1;
                client.threats_blocked += 1;
            }
            EntryKind::RateLimited => {
                self.rate_limited += 1;
                client.rate_limited += 1;
            }
            EntryKind::Malformed => self.malformed += 1,
        }
    }

    fn finish(self) -> Report {
        let mut clients: Vec<ClientSummary> = self.clients.into_values().collect();
        clients.sort_by(|a, b| {
            b.total_requests
                .cmp(&a.total_requests)
                .then_with(|| a.client.cmp(&b.client))
        });

        Report {
            total_requests: self.allowed + self.blocked + self.rate_limited + self.malformed,
            allowed: self.allowed,
            threats_blocked: self.blocked,
            rate_limited: self.rate_limited,
            malformed: self.malformed,
            clients,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LOG: &str = "\
2026-10-18T09:00:00.000001Z  INFO mif_firewall: Allowed request from IP 10.0.0.1: Write me a poem
2026-10-18T09:00:01.000001Z  WARN mif_firewall: Blocked request from IP 10.0.0.2: reason=injection: bypass prompt=bypass it
2026-10-19T09:00:02.000001Z  INFO request{method=POST uri=/infer version=HTTP/1.1}: mif_firewall: Allowed request from IP ::1: hi
2026-10-19T09:00:03.000001Z  WARN mif_firewall: Rate limited request from IP 10.0.0.1: reason=rate limit exceeded prompt=again
2026-10-19T09:00:04.000001Z  INFO inference_firewall::http::server: HTTP server starting
2026-10-19T09:00:05.000001Z  WARN mif_firewall: Malformed request from IP 10.0.0.3: body is not a JSON object
2026-10-20T09:00:06.000001Z  INFO mif_firewall: Allowed request from IP 10.0.0.1: 
";

    #[test]
    fn parses_audit_lines_only() {
        let parser = AuditLogParser::new().unwrap();
        let entries: Vec<AuditEntry> = LOG.lines().filter_map(|l| parser.parse_line(l)).collect();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[1].kind, EntryKind::Blocked);
        assert_eq!(entries[1].client, "10.0.0.2");
        assert_eq!(entries[2].client, "::1");
        assert_eq!(entries[2].date(), "2026-10-19");
    }

    #[test]
    fn summarizes_per_client() {
        let parser = AuditLogParser::new().unwrap();
        let report = parser.summarize(Cursor::new(LOG), &DateRange::default()).unwrap();

        assert_eq!(report.total_requests, 6);
        assert_eq!(report.allowed, 3);
        assert_eq!(report.threats_blocked, 1);
        assert_eq!(report.rate_limited, 1);
        assert_eq!(report.malformed, 1);

        assert_eq!(report.clients[0].client, "10.0.0.1");
        assert_eq!(report.clients[0].total_requests, 3);
        assert_eq!(report.clients[0].rate_limited, 1);
    }

    #[test]
    fn date_range_is_inclusive() {
        let parser = AuditLogParser::new().unwrap();
        let range = DateRange {
            from: Some("2026-10-19".into()),
            to: Some("2026-10-19".into()),
        };
        let report = parser.summarize(Cursor::new(LOG), &range).unwrap();
        assert_eq!(report.total_requests, 3);
        assert_eq!(report.threats_blocked, 0);
    }
}
