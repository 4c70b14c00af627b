use serde::Serialize;

use crate::client::models::{JobStatus, LiveCounts, ScanResultPayload, StatusResponse};

/// Session lifecycle state. `Queued` and `Scanning` are the only
/// non-terminal states; transitions are one-directional into a terminal
/// state and never leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Queued,
    Scanning,
    Completed,
    Error,
    Canceled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Error | SessionStatus::Canceled
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Queued => "queued",
            SessionStatus::Scanning => "scanning",
            SessionStatus::Completed => "completed",
            SessionStatus::Error => "error",
            SessionStatus::Canceled => "canceled",
        }
    }
}

impl From<JobStatus> for SessionStatus {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Queued => SessionStatus::Queued,
            JobStatus::Scanning => SessionStatus::Scanning,
            JobStatus::Completed => SessionStatus::Completed,
            JobStatus::Error => SessionStatus::Error,
            JobStatus::Canceled => SessionStatus::Canceled,
        }
    }
}

/// Work-unit progress within the current phase (URLs during the web scan,
/// ports during the port scan).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanProgress {
    pub current_unit: u32,
    pub total_unit: u32,
}

/// One tracked lifecycle of a single remote scan job. Owned exclusively by
/// the tracker; mutated only by poll responses or explicit cancellation.
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub scan_id: String,
    pub status: SessionStatus,
    pub phase: Option<String>,
    pub progress: ScanProgress,
    pub live_counts: LiveCounts,
    pub result: Option<ScanResultPayload>,
    pub message: Option<String>,
}

impl ScanSession {
    pub fn new(scan_id: String, status: SessionStatus, total_unit: u32) -> Self {
        Self {
            scan_id,
            status,
            phase: None,
            progress: ScanProgress {
                current_unit: 0,
                total_unit,
            },
            live_counts: LiveCounts::default(),
            result: None,
            message: None,
        }
    }

    /// Merge one status response into the session. A terminal session is
    /// never mutated again, whatever the response claims.
    pub fn apply_status(&mut self, status: StatusResponse) {
        if self.status.is_terminal() {
            return;
        }

        // Transitions are one-directional: once scanning has been observed,
        // a stale queued report from the service is ignored.
        let incoming: SessionStatus = status.status.into();
        if !(self.status == SessionStatus::Scanning && incoming == SessionStatus::Queued) {
            self.status = incoming;
        }

        if status.phase.is_some() {
            self.phase = status.phase;
        }

        // Port-scan phases report ports as the work unit, everything else
        // reports URLs.
        let port_phase = self.phase.as_deref() == Some("port_scan");
        let (current, total) = if port_phase {
            (status.current_port, status.total_ports)
        } else {
            (status.current_url, status.total_urls)
        };
        if let Some(current) = current {
            self.progress.current_unit = current;
        }
        if let Some(total) = total {
            if total > 0 {
                self.progress.total_unit = total;
            }
        }

        if let Some(counts) = status.findings {
            self.live_counts = counts;
        }
        if status.message.is_some() {
            self.message = status.message;
        }
        if self.status == SessionStatus::Completed {
            self.result = status.result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanning_status() -> StatusResponse {
        StatusResponse {
            status: JobStatus::Scanning,
            phase: Some("web_scan".to_string()),
            current_url: Some(4),
            total_urls: Some(30),
            current_port: None,
            total_ports: None,
            findings: Some(LiveCounts {
                sqli: 1,
                xss: 0,
                csrf: 2,
            }),
            message: None,
            result: None,
        }
    }

    #[test]
    fn merges_progress_and_live_counts() {
        let mut session = ScanSession::new("abc".into(), SessionStatus::Scanning, 30);
        session.apply_status(scanning_status());

        assert_eq!(session.status, SessionStatus::Scanning);
        assert_eq!(session.phase.as_deref(), Some("web_scan"));
        assert_eq!(session.progress.current_unit, 4);
        assert_eq!(session.progress.total_unit, 30);
        assert_eq!(session.live_counts.sqli, 1);
        assert_eq!(session.live_counts.csrf, 2);
    }

    #[test]
    fn port_scan_phase_tracks_ports() {
        let mut session = ScanSession::new("abc".into(), SessionStatus::Scanning, 30);
        session.apply_status(StatusResponse {
            status: JobStatus::Scanning,
            phase: Some("port_scan".to_string()),
            current_url: None,
            total_urls: None,
            current_port: Some(80),
            total_ports: Some(1000),
            findings: None,
            message: None,
            result: None,
        });
        assert_eq!(session.progress.current_unit, 80);
        assert_eq!(session.progress.total_unit, 1000);
    }

    #[test]
    fn completed_stores_result() {
        let mut session = ScanSession::new("abc".into(), SessionStatus::Scanning, 30);
        session.apply_status(StatusResponse {
            status: JobStatus::Completed,
            phase: None,
            current_url: None,
            total_urls: None,
            current_port: None,
            total_ports: None,
            findings: None,
            message: Some("Scan completed".to_string()),
            result: Some(Default::default()),
        });
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.result.is_some());
        assert_eq!(session.message.as_deref(), Some("Scan completed"));
    }

    #[test]
    fn scanning_never_regresses_to_queued() {
        let mut session = ScanSession::new("abc".into(), SessionStatus::Scanning, 30);
        session.apply_status(StatusResponse {
            status: JobStatus::Queued,
            phase: None,
            current_url: Some(2),
            total_urls: None,
            current_port: None,
            total_ports: None,
            findings: None,
            message: None,
            result: None,
        });

        // Status holds, but the rest of the report still merges.
        assert_eq!(session.status, SessionStatus::Scanning);
        assert_eq!(session.progress.current_unit, 2);
    }

    #[test]
    fn terminal_state_is_never_mutated() {
        let mut session = ScanSession::new("abc".into(), SessionStatus::Canceled, 30);
        session.apply_status(scanning_status());

        assert_eq!(session.status, SessionStatus::Canceled);
        assert_eq!(session.progress.current_unit, 0);
        assert!(session.result.is_none());
    }
}
