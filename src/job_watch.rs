//! State machine for watching one submitted job.
//!
//! The watcher is pure: it never fetches and never sleeps. Callers feed it
//! decoded [`JobStatus`] responses via [`JobWatcher::observe`] and drive its
//! timer with an explicit millisecond clock, which keeps the whole
//! completion protocol testable with a simulated clock.
//!
//! Two completion signals arrive from the server and are deliberately kept
//! independent, matching the service contract:
//! - the free-text `status` field equal to `"done"` publishes the result
//!   link and arms the delayed navigation;
//! - the `short_status` tag being terminal (`done` or `failed`) means
//!   polling should stop.

use crate::api::{JobStatus, ShortStatus};

/// Delay between spotting a finished job and navigating to its results.
pub const REDIRECT_DELAY_MS: u64 = 5_000;

/// What the UI should currently show for the watched job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRender {
    /// Free-text status, newlines preserved; the label widget renders them
    /// as line breaks.
    pub status_text: String,
    pub last_changed: String,
    /// Icon file name under the configured image directory.
    pub icon_file: Option<String>,
    /// Result link to display once the job reports itself done.
    pub result_url: Option<String>,
}

#[derive(Debug)]
pub struct JobWatcher {
    redirect_delay_ms: u64,
    render: JobRender,
    short_status: Option<ShortStatus>,
    /// Pending one-shot navigation deadline; re-armed (replaced, never
    /// stacked) on every observation that reports completion.
    redirect_due: Option<(u64, String)>,
    navigated: bool,
}

impl Default for JobWatcher {
    fn default() -> Self {
        Self::new(REDIRECT_DELAY_MS)
    }
}

impl JobWatcher {
    pub fn new(redirect_delay_ms: u64) -> Self {
        Self {
            redirect_delay_ms,
            render: JobRender::default(),
            short_status: None,
            redirect_due: None,
            navigated: false,
        }
    }

    /// Apply one polled response at clock time `now_ms`.
    pub fn observe(&mut self, now_ms: u64, job: &JobStatus) {
        self.short_status = Some(job.short());
        self.render.status_text = job.status.clone();
        self.render.last_changed = job.last_changed.clone();
        self.render.icon_file = Some(job.icon_file());

        // Completion is keyed on the free-text status, not the tag.
        if job.status != "done" {
            return;
        }
        let Some(result_url) = job.result_url.as_deref() else {
            tracing::warn!("job reported done but carried no result_url");
            return;
        };
        self.render.result_url = Some(result_url.to_string());
        if !self.navigated {
            // A fresh completion observation replaces any pending deadline.
            self.redirect_due = Some((now_ms + self.redirect_delay_ms, result_url.to_string()));
        }
    }

    pub fn render(&self) -> &JobRender {
        &self.render
    }

    pub fn short_status(&self) -> Option<ShortStatus> {
        self.short_status
    }

    /// True once the job reached a state polling can never leave.
    /// The armed redirect still fires after this turns true.
    pub fn is_terminal(&self) -> bool {
        self.short_status.is_some_and(ShortStatus::is_terminal)
    }

    /// Return the navigation target if the armed redirect deadline has
    /// passed. Fires at most once for the lifetime of the watcher.
    pub fn take_navigation(&mut self, now_ms: u64) -> Option<String> {
        let (due, _) = self.redirect_due.as_ref()?;
        if now_ms < *due {
            return None;
        }
        let (_, url) = self.redirect_due.take()?;
        self.navigated = true;
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(step: &str) -> JobStatus {
        JobStatus {
            short_status: "running".to_string(),
            status: step.to_string(),
            last_changed: "2016-01-01 12:00".to_string(),
            result_url: None,
        }
    }

    fn done(url: &str) -> JobStatus {
        JobStatus {
            short_status: "done".to_string(),
            status: "done".to_string(),
            last_changed: "2016-01-01 13:00".to_string(),
            result_url: Some(url.to_string()),
        }
    }

    #[test]
    fn test_running_job_renders_without_arming_redirect() {
        let mut watcher = JobWatcher::default();
        watcher.observe(0, &running("running: gene finding\nstep 2 of 7"));
        assert_eq!(
            watcher.render().status_text,
            "running: gene finding\nstep 2 of 7"
        );
        assert_eq!(watcher.render().icon_file.as_deref(), Some("running.gif"));
        assert_eq!(watcher.render().result_url, None);
        assert!(!watcher.is_terminal());
        assert_eq!(watcher.take_navigation(u64::MAX), None);
    }

    #[test]
    fn test_done_job_shows_link_then_navigates_once_after_delay() {
        let mut watcher = JobWatcher::default();
        watcher.observe(0, &running("running"));
        watcher.observe(10_000, &running("running"));
        watcher.observe(20_000, &done("http://x/r"));

        assert_eq!(watcher.render().result_url.as_deref(), Some("http://x/r"));
        assert!(watcher.is_terminal());

        // Not before the 5 s delay has passed.
        assert_eq!(watcher.take_navigation(24_999), None);
        assert_eq!(
            watcher.take_navigation(25_000).as_deref(),
            Some("http://x/r")
        );
        // Exactly once, even if the clock keeps running.
        assert_eq!(watcher.take_navigation(60_000), None);
    }

    #[test]
    fn test_repeated_done_observations_rearm_instead_of_stacking() {
        let mut watcher = JobWatcher::default();
        watcher.observe(0, &done("http://x/r"));
        // Next poll arrives before the redirect fires: deadline moves.
        watcher.observe(4_000, &done("http://x/r"));
        assert_eq!(watcher.take_navigation(5_000), None);
        assert_eq!(watcher.take_navigation(9_000).as_deref(), Some("http://x/r"));
        // Later completion reports never navigate again.
        watcher.observe(30_000, &done("http://x/r"));
        assert_eq!(watcher.take_navigation(90_000), None);
    }

    #[test]
    fn test_failed_job_is_terminal_without_navigation() {
        let mut watcher = JobWatcher::default();
        let failed = JobStatus {
            short_status: "failed".to_string(),
            status: "failed: invalid input file".to_string(),
            last_changed: "2016-01-01 13:00".to_string(),
            result_url: None,
        };
        watcher.observe(0, &failed);
        assert!(watcher.is_terminal());
        assert_eq!(watcher.render().icon_file.as_deref(), Some("failed.gif"));
        // No link and no pending redirect: callers can report the failure
        // immediately instead of waiting out the redirect delay.
        assert_eq!(watcher.render().result_url, None);
        assert_eq!(watcher.take_navigation(u64::MAX), None);
    }

    #[test]
    fn test_done_text_and_terminal_tag_evaluated_independently() {
        // Server may report the free text "done" while the tag lags behind:
        // the link appears and the redirect arms, but polling keeps going.
        let mut watcher = JobWatcher::default();
        let divergent = JobStatus {
            short_status: "running".to_string(),
            status: "done".to_string(),
            last_changed: "2016-01-01 13:00".to_string(),
            result_url: Some("http://x/r".to_string()),
        };
        watcher.observe(0, &divergent);
        assert!(!watcher.is_terminal());
        assert_eq!(watcher.render().result_url.as_deref(), Some("http://x/r"));
        assert_eq!(watcher.take_navigation(5_000).as_deref(), Some("http://x/r"));

        // And the converse: terminal tag without the "done" text stops
        // polling but never navigates.
        let mut watcher = JobWatcher::default();
        let divergent = JobStatus {
            short_status: "done".to_string(),
            status: "finished".to_string(),
            last_changed: "2016-01-01 13:00".to_string(),
            result_url: Some("http://x/r".to_string()),
        };
        watcher.observe(0, &divergent);
        assert!(watcher.is_terminal());
        assert_eq!(watcher.render().result_url, None);
        assert_eq!(watcher.take_navigation(u64::MAX), None);
    }
}
