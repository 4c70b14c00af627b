use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::models::ScanRequest;
use crate::client::ScanService;
use crate::errors::WebscanError;

use super::state::{ScanSession, SessionStatus};

/// The cancelable poll task for one submission. Created by `submit`,
/// consumed by `cancel`; at most one exists per tracker.
struct PollHandle {
    token: CancellationToken,
    _join: JoinHandle<()>,
}

/// Owns the submit → poll → terminal-state protocol for one remote scan
/// job at a time. A new submission always starts a fresh session and
/// cancels any poll task left over from the previous one.
pub struct SessionTracker {
    service: Arc<dyn ScanService>,
    session: Arc<RwLock<Option<ScanSession>>>,
    poll: Option<PollHandle>,
    interval: Duration,
}

impl SessionTracker {
    pub fn new(service: Arc<dyn ScanService>, interval: Duration) -> Self {
        Self {
            service,
            session: Arc::new(RwLock::new(None)),
            poll: None,
            interval,
        }
    }

    /// Current session snapshot, if any submission has happened.
    pub async fn session(&self) -> Option<ScanSession> {
        self.session.read().await.clone()
    }

    /// Submit a scan request. On success the session enters `Scanning`
    /// (or `Queued` when the service says so) and the poll task starts;
    /// on failure the session is terminal `Error` and nothing polls.
    /// `total_unit` seeds the progress denominator from the effective
    /// profile limits until the service reports its own.
    pub async fn submit(
        &mut self,
        request: &ScanRequest,
        total_unit: u32,
    ) -> Result<String, WebscanError> {
        self.stop_poll_task();
        *self.session.write().await = None;

        match self.service.submit_scan(request).await {
            Ok(start) => {
                let status = match start.status.as_deref() {
                    Some("queued") => SessionStatus::Queued,
                    _ => SessionStatus::Scanning,
                };
                info!(scan_id = %start.scan_id, status = status.label(), "Scan submitted");
                *self.session.write().await =
                    Some(ScanSession::new(start.scan_id.clone(), status, total_unit));
                self.spawn_poll_task(start.scan_id.clone());
                Ok(start.scan_id)
            }
            Err(e) => {
                let mut session =
                    ScanSession::new(String::new(), SessionStatus::Error, total_unit);
                session.message = Some(e.to_string());
                *self.session.write().await = Some(session);
                Err(e)
            }
        }
    }

    /// Cancel the active session: the poll task is stopped first, a stop
    /// request goes to the service, and the session is forced to
    /// `Canceled` locally whatever the stop request returns. A failed
    /// stop acknowledgment is surfaced as a warning, never as a new
    /// session state.
    pub async fn cancel(&mut self) -> Result<(), WebscanError> {
        self.stop_poll_task();

        let scan_id = match self.session.read().await.as_ref() {
            Some(session) if !session.status.is_terminal() => session.scan_id.clone(),
            _ => return Ok(()),
        };

        let stop_result = self.service.stop_scan(&scan_id).await;

        {
            let mut guard = self.session.write().await;
            if let Some(session) = guard.as_mut() {
                if !session.status.is_terminal() {
                    session.status = SessionStatus::Canceled;
                    session.message = Some("Scan canceled by user".to_string());
                }
            }
        }

        match stop_result {
            Ok(_) => info!(scan_id = %scan_id, "Scan canceled"),
            Err(e) => {
                warn!(scan_id = %scan_id, error = %e, "Stop request failed; session canceled locally")
            }
        }
        Ok(())
    }

    /// Block until the session reaches a terminal state, returning the
    /// final snapshot.
    pub async fn wait(&self) -> Option<ScanSession> {
        loop {
            match self.session.read().await.clone() {
                Some(session) if session.status.is_terminal() => return Some(session),
                Some(_) => {}
                None => return None,
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    fn stop_poll_task(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.token.cancel();
        }
    }

    fn spawn_poll_task(&mut self, scan_id: String) {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let service = self.service.clone();
        let session = self.session.clone();
        let interval = self.interval;

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; swallow that so the first poll
            // happens one full period after submission
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let outcome = service.get_status(&scan_id).await;

                // A response that lands after cancellation is discarded:
                // once cancel() returns, no poll firing mutates the session.
                if task_token.is_cancelled() {
                    break;
                }

                match outcome {
                    Ok(status) => {
                        let mut guard = session.write().await;
                        let current = match guard.as_mut() {
                            Some(s) if s.scan_id == scan_id => s,
                            _ => break,
                        };
                        if current.status.is_terminal() {
                            break;
                        }
                        current.apply_status(status);
                        if current.status.is_terminal() {
                            debug!(
                                scan_id = %scan_id,
                                status = current.status.label(),
                                "Scan reached terminal state"
                            );
                            break;
                        }
                    }
                    Err(e) => {
                        // Transport failure is fatal for the session; the
                        // remote service owns retries for its own work.
                        warn!(scan_id = %scan_id, error = %e, "Status poll failed");
                        let mut guard = session.write().await;
                        if let Some(current) = guard.as_mut() {
                            if current.scan_id == scan_id && !current.status.is_terminal() {
                                current.status = SessionStatus::Error;
                                current.message = Some(e.to_string());
                            }
                        }
                        break;
                    }
                }
            }
        });

        self.poll = Some(PollHandle { token, _join: join });
    }
}

impl Drop for SessionTracker {
    fn drop(&mut self) {
        self.stop_poll_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::{
        CompareResponse, HistoryResponse, JobStatus, LiveCounts, ScanResultPayload,
        StartScanResponse, StatusResponse, StopScanResponse,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const TICK: Duration = Duration::from_millis(5);

    fn request() -> ScanRequest {
        ScanRequest {
            url: "https://example.com".to_string(),
            profile: "standard".to_string(),
            custom_config: None,
            check_sqli: true,
            check_xss: true,
            check_csrf: true,
        }
    }

    fn scanning(current: u32) -> StatusResponse {
        StatusResponse {
            status: JobStatus::Scanning,
            phase: Some("web_scan".to_string()),
            current_url: Some(current),
            total_urls: Some(30),
            current_port: None,
            total_ports: None,
            findings: Some(LiveCounts {
                sqli: 0,
                xss: 1,
                csrf: 0,
            }),
            message: None,
            result: None,
        }
    }

    fn completed() -> StatusResponse {
        StatusResponse {
            status: JobStatus::Completed,
            phase: None,
            current_url: None,
            total_urls: None,
            current_port: None,
            total_ports: None,
            findings: None,
            message: Some("Scan completed".to_string()),
            result: Some(ScanResultPayload {
                url: "https://example.com".to_string(),
                ..Default::default()
            }),
        }
    }

    /// Scripted service: each poll pops the next status; when the script
    /// runs dry the last scripted entry repeats.
    struct MockService {
        submit_ok: bool,
        stop_ok: bool,
        statuses: Mutex<VecDeque<Result<StatusResponse, String>>>,
        status_calls: AtomicU32,
        stop_calls: AtomicU32,
    }

    impl MockService {
        fn new(statuses: Vec<Result<StatusResponse, String>>) -> Self {
            Self {
                submit_ok: true,
                stop_ok: true,
                statuses: Mutex::new(statuses.into()),
                status_calls: AtomicU32::new(0),
                stop_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ScanService for MockService {
        async fn submit_scan(
            &self,
            _request: &ScanRequest,
        ) -> Result<StartScanResponse, WebscanError> {
            if self.submit_ok {
                Ok(StartScanResponse {
                    scan_id: "scan-1".to_string(),
                    status: None,
                })
            } else {
                Err(WebscanError::Submission("target unreachable".to_string()))
            }
        }

        async fn get_status(&self, _scan_id: &str) -> Result<StatusResponse, WebscanError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let mut statuses = self.statuses.lock().unwrap();
            let next = if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().cloned()
            };
            match next {
                Some(Ok(status)) => Ok(status),
                Some(Err(message)) => Err(WebscanError::PollTransport(message)),
                None => Err(WebscanError::PollTransport("script exhausted".to_string())),
            }
        }

        async fn stop_scan(&self, _scan_id: &str) -> Result<StopScanResponse, WebscanError> {
            self.stop_calls.fetch_add(1, Ordering::SeqCst);
            if self.stop_ok {
                Ok(StopScanResponse {
                    success: true,
                    status: Some("canceled".to_string()),
                })
            } else {
                Err(WebscanError::Network("stop rejected".to_string()))
            }
        }

        async fn fetch_history(&self, _url: &str) -> Result<HistoryResponse, WebscanError> {
            Err(WebscanError::Internal("not scripted".to_string()))
        }

        async fn compare_scans(
            &self,
            _url: &str,
            _a: Option<usize>,
            _b: Option<usize>,
        ) -> Result<CompareResponse, WebscanError> {
            Err(WebscanError::Internal("not scripted".to_string()))
        }
    }

    #[tokio::test]
    async fn submit_enters_scanning_with_profile_total() {
        let service = Arc::new(MockService::new(vec![Ok(scanning(0))]));
        let mut tracker = SessionTracker::new(service, TICK);

        let scan_id = tracker.submit(&request(), 30).await.unwrap();
        assert_eq!(scan_id, "scan-1");

        let session = tracker.session().await.unwrap();
        assert_eq!(session.status, SessionStatus::Scanning);
        assert_eq!(session.progress.total_unit, 30);
    }

    #[tokio::test]
    async fn failed_submit_is_terminal_error_without_polling() {
        let mut service = MockService::new(vec![Ok(scanning(0))]);
        service.submit_ok = false;
        let service = Arc::new(service);
        let mut tracker = SessionTracker::new(service.clone(), TICK);

        assert!(tracker.submit(&request(), 30).await.is_err());

        let session = tracker.session().await.unwrap();
        assert_eq!(session.status, SessionStatus::Error);
        assert!(session.message.as_deref().unwrap().contains("target unreachable"));

        tokio::time::sleep(TICK * 5).await;
        assert_eq!(service.status_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn poll_merges_progress_then_stores_result_on_completion() {
        let service = Arc::new(MockService::new(vec![
            Ok(scanning(5)),
            Ok(scanning(12)),
            Ok(completed()),
        ]));
        let mut tracker = SessionTracker::new(service.clone(), TICK);

        tracker.submit(&request(), 30).await.unwrap();
        let session = tracker.wait().await.unwrap();

        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.result.is_some());
        assert_eq!(session.live_counts.xss, 1);

        // Polling stopped at the terminal response.
        let calls = service.status_calls.load(Ordering::SeqCst);
        tokio::time::sleep(TICK * 5).await;
        assert_eq!(service.status_calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn job_reported_error_passes_message_through() {
        let failed = StatusResponse {
            status: JobStatus::Error,
            message: Some("crawler crashed".to_string()),
            phase: None,
            current_url: None,
            total_urls: None,
            current_port: None,
            total_ports: None,
            findings: None,
            result: None,
        };
        let service = Arc::new(MockService::new(vec![Ok(failed)]));
        let mut tracker = SessionTracker::new(service, TICK);

        tracker.submit(&request(), 30).await.unwrap();
        let session = tracker.wait().await.unwrap();

        assert_eq!(session.status, SessionStatus::Error);
        assert_eq!(session.message.as_deref(), Some("crawler crashed"));
    }

    #[tokio::test]
    async fn transport_failure_is_fatal_for_the_session() {
        let service = Arc::new(MockService::new(vec![Err("connection reset".to_string())]));
        let mut tracker = SessionTracker::new(service.clone(), TICK);

        tracker.submit(&request(), 30).await.unwrap();
        let session = tracker.wait().await.unwrap();

        assert_eq!(session.status, SessionStatus::Error);
        assert!(session.message.as_deref().unwrap().contains("connection reset"));

        // No retry after the fatal poll.
        tokio::time::sleep(TICK * 5).await;
        assert_eq!(service.status_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_wins_locally_even_when_stop_fails() {
        let mut service = MockService::new(vec![Ok(scanning(1))]);
        service.stop_ok = false;
        let service = Arc::new(service);
        let mut tracker = SessionTracker::new(service.clone(), TICK);

        tracker.submit(&request(), 30).await.unwrap();
        tracker.cancel().await.unwrap();

        let session = tracker.session().await.unwrap();
        assert_eq!(session.status, SessionStatus::Canceled);
        assert_eq!(service.stop_calls.load(Ordering::SeqCst), 1);

        // Late poll firings never resurrect the session.
        tokio::time::sleep(TICK * 5).await;
        let session = tracker.session().await.unwrap();
        assert_eq!(session.status, SessionStatus::Canceled);
        assert!(session.result.is_none());
    }

    #[tokio::test]
    async fn new_submission_replaces_previous_session() {
        let service = Arc::new(MockService::new(vec![Ok(scanning(3))]));
        let mut tracker = SessionTracker::new(service, TICK);

        tracker.submit(&request(), 30).await.unwrap();
        tokio::time::sleep(TICK * 3).await;
        tracker.submit(&request(), 10).await.unwrap();

        let session = tracker.session().await.unwrap();
        assert!(!session.status.is_terminal());
        assert_eq!(session.progress.total_unit, 10);
    }
}
