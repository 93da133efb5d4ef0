//! Shared UI state and the event channel feeding it.
//!
//! Poll threads never touch widgets; they send [`UiEvent`]s over an mpsc
//! channel and the egui thread drains them each frame. Later events for the
//! same target simply overwrite earlier ones (last write wins), which is
//! what makes overlapping in-flight requests harmless.

use crate::api::{JobStatus, Notice, ServerStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Server(ServerStatus),
    Job(JobStatus),
    Notices(Vec<Notice>),
}

/// A notice plus its dismissed flag. Dismissing hides the card; a later
/// fetch appends fresh cards, it never resurrects dismissed ones.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeCard {
    pub notice: Notice,
    pub dismissed: bool,
}

#[derive(Debug, Default)]
pub struct UiState {
    server: Option<ServerStatus>,
    notices: Vec<NoticeCard>,
}

impl UiState {
    pub fn server(&self) -> Option<&ServerStatus> {
        self.server.as_ref()
    }

    pub fn notices_mut(&mut self) -> &mut [NoticeCard] {
        &mut self.notices
    }

    pub fn visible_notice_count(&self) -> usize {
        self.notices.iter().filter(|card| !card.dismissed).count()
    }

    pub fn set_server(&mut self, status: ServerStatus) {
        self.server = Some(status);
    }

    pub fn append_notices(&mut self, notices: Vec<Notice>) {
        self.notices.extend(notices.into_iter().map(|notice| NoticeCard {
            notice,
            dismissed: false,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(teaser: &str) -> Notice {
        Notice {
            category: "info".to_string(),
            teaser: teaser.to_string(),
            text: "body".to_string(),
        }
    }

    #[test]
    fn test_empty_notice_fetch_changes_nothing() {
        let mut state = UiState::default();
        state.append_notices(vec![]);
        assert_eq!(state.visible_notice_count(), 0);
        assert!(state.notices_mut().is_empty());
    }

    #[test]
    fn test_refetch_appends_without_deduplication() {
        let mut state = UiState::default();
        state.append_notices(vec![notice("maintenance")]);
        state.append_notices(vec![notice("maintenance")]);
        assert_eq!(state.visible_notice_count(), 2);
    }

    #[test]
    fn test_notice_text_is_kept_verbatim() {
        // Markup-looking content must reach the label untouched; the label
        // widget renders it as literal text.
        let mut state = UiState::default();
        state.append_notices(vec![Notice {
            category: "info".to_string(),
            teaser: "<b>bold?</b>".to_string(),
            text: "line one\n<script>alert(1)</script>".to_string(),
        }]);
        let card = &state.notices_mut()[0];
        assert_eq!(card.notice.teaser, "<b>bold?</b>");
        assert_eq!(card.notice.text, "line one\n<script>alert(1)</script>");
    }

    #[test]
    fn test_dismissed_notices_stay_dismissed() {
        let mut state = UiState::default();
        state.append_notices(vec![notice("a"), notice("b")]);
        state.notices_mut()[0].dismissed = true;
        assert_eq!(state.visible_notice_count(), 1);
        state.append_notices(vec![notice("c")]);
        assert_eq!(state.visible_notice_count(), 2);
    }

    #[test]
    fn test_server_snapshot_is_last_write_wins() {
        let mut state = UiState::default();
        state.set_server(ServerStatus {
            status: "working".to_string(),
            queue_length: 7,
            running: 2,
        });
        state.set_server(ServerStatus {
            status: "idle".to_string(),
            queue_length: 0,
            running: 0,
        });
        assert_eq!(state.server().map(|s| s.queue_length), Some(0));
    }
}
