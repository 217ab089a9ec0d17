//! Local state behind the feedback page.
//!
//! `FeedbackBoard` owns the list that the initial fetch fills and that
//! successful submissions prepend to, the two edit buffers, the loading flag
//! and the transient status banner. It knows nothing about Dioxus; the
//! component drives it from event handlers and spawned continuations.
//!
//! Submission flow:
//!
//! ```text
//! Idle -> Validating -> RejectedValidation -> Idle
//!                    -> Submitting -> Success -> Idle
//!                                  -> Failure -> Idle
//! ```
//!
//! The loading flag is true only while `Submitting`.

use crate::api::{ApiError, EntryId, FeedbackEntry, NewFeedback};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// How long a status banner stays up.
pub const STATUS_TTL: Duration = Duration::from_millis(3000);

pub const MSG_FILL_ALL_FIELDS: &str = "msg-fill-all-fields";
pub const MSG_LOAD_ERROR: &str = "msg-load-error";
pub const MSG_SUBMIT_ERROR: &str = "msg-submit-error";
pub const MSG_SUBMITTED: &str = "msg-submitted";

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("name and comment must not be empty")]
    Validation,

    #[error("a submission is already in flight")]
    Busy,

    #[error("could not load feedbacks: {0}")]
    Fetch(#[source] ApiError),

    #[error("could not submit feedback: {0}")]
    Submit(#[source] ApiError),
}

impl FeedbackError {
    /// Catalogue key of the banner shown for this error, if any.
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            FeedbackError::Validation => Some(MSG_FILL_ALL_FIELDS),
            FeedbackError::Busy => None,
            FeedbackError::Fetch(_) => Some(MSG_LOAD_ERROR),
            FeedbackError::Submit(_) => Some(MSG_SUBMIT_ERROR),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub key: &'static str,
    seq: u64,
}

impl StatusMessage {
    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
}

/// Handed out when a list fetch starts, returned when it lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    local_seq: u64,
}

#[derive(Clone, Debug, Default)]
pub struct FeedbackBoard {
    entries: Vec<FeedbackEntry>,
    name: String,
    comment: String,
    phase: SubmitPhase,
    status: Option<StatusMessage>,
    status_seq: u64,
    // Entries created by this client while a fetch was in flight, newest
    // first, tagged with local_seq.
    local: Vec<(u64, FeedbackEntry)>,
    local_seq: u64,
    fetches_started: u64,
    fetches_in_flight: u64,
    fetch_applied: Option<u64>,
}

impl FeedbackBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[FeedbackEntry] {
        &self.entries
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetches_started += 1;
        self.fetches_in_flight += 1;
        FetchTicket {
            generation: self.fetches_started,
            local_seq: self.local_seq,
        }
    }

    /// Applies a finished list fetch. Returns the sequence number of the
    /// banner it raised, so the caller can schedule its expiry.
    ///
    /// Entries this client created after the fetch started and that the
    /// server did not include stay in front of the fetched list. A fetch that
    /// started before an already applied one is dropped.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<FeedbackEntry>, ApiError>,
    ) -> Option<u64> {
        self.fetches_in_flight = self.fetches_in_flight.saturating_sub(1);

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(err) => {
                self.forget_local_if_idle();
                return self.report(&FeedbackError::Fetch(err));
            }
        };

        if let Some(applied) = self.fetch_applied {
            if ticket.generation < applied {
                log::debug!(
                    "dropping stale fetch #{} (already applied #{})",
                    ticket.generation,
                    applied
                );
                self.forget_local_if_idle();
                return None;
            }
        }

        let fetched_ids: HashSet<&EntryId> = fetched.iter().map(|e| &e.id).collect();
        let kept: Vec<(u64, FeedbackEntry)> = self
            .local
            .iter()
            .filter(|(seq, entry)| *seq > ticket.local_seq && !fetched_ids.contains(&entry.id))
            .cloned()
            .collect();

        log::info!(
            "loaded {} feedbacks ({} local kept in front)",
            fetched.len(),
            kept.len()
        );

        self.entries = kept.iter().map(|(_, e)| e.clone()).chain(fetched).collect();
        self.local = kept;
        self.fetch_applied = Some(ticket.generation);
        self.forget_local_if_idle();
        None
    }

    /// Validates the edit buffers and enters `Submitting`.
    ///
    /// On `Err` nothing changed yet; pass the error to [`report`](Self::report)
    /// to raise the banner.
    pub fn begin_submit(&mut self) -> Result<NewFeedback, FeedbackError> {
        if self.is_loading() {
            return Err(FeedbackError::Busy);
        }
        if self.name.trim().is_empty() || self.comment.trim().is_empty() {
            return Err(FeedbackError::Validation);
        }

        self.phase = SubmitPhase::Submitting;
        Ok(NewFeedback {
            name: self.name.clone(),
            comment: self.comment.clone(),
        })
    }

    /// Leaves `Submitting`. Returns the sequence number of the raised banner.
    pub fn finish_submit(&mut self, result: Result<FeedbackEntry, ApiError>) -> Option<u64> {
        self.phase = SubmitPhase::Idle;

        match result {
            Ok(entry) => {
                log::info!("feedback {} submitted", entry.id);
                self.local_seq += 1;
                if self.fetches_in_flight > 0 {
                    self.local.insert(0, (self.local_seq, entry.clone()));
                }
                self.entries.insert(0, entry);
                self.name.clear();
                self.comment.clear();
                Some(self.set_status(StatusKind::Success, MSG_SUBMITTED))
            }
            Err(err) => self.report(&FeedbackError::Submit(err)),
        }
    }

    /// Logs `err` and raises its banner.
    pub fn report(&mut self, err: &FeedbackError) -> Option<u64> {
        match err {
            FeedbackError::Validation | FeedbackError::Busy => log::debug!("{err}"),
            FeedbackError::Fetch(_) | FeedbackError::Submit(_) => log::error!("{err}"),
        }
        let key = err.message_key()?;
        Some(self.set_status(StatusKind::Error, key))
    }

    /// Clears the banner raised with `seq`. A newer banner is left alone.
    pub fn expire_status(&mut self, seq: u64) {
        if self.status.as_ref().is_some_and(|s| s.seq == seq) {
            self.status = None;
        }
    }

    // With no fetch in flight nothing can overwrite `entries`, so the
    // locally created copies are no longer needed.
    fn forget_local_if_idle(&mut self) {
        if self.fetches_in_flight == 0 {
            self.local.clear();
        }
    }

    fn set_status(&mut self, kind: StatusKind, key: &'static str) -> u64 {
        self.status_seq += 1;
        self.status = Some(StatusMessage {
            kind,
            key,
            seq: self.status_seq,
        });
        self.status_seq
    }
}

/// Mutable access to the board from a UI continuation.
pub trait BoardHandle {
    fn update<R>(&mut self, f: impl FnOnce(&mut FeedbackBoard) -> R) -> R;
}

/// Initial list load: takes a ticket, awaits `fetch`, applies the result and
/// keeps any error banner up for [`STATUS_TTL`].
pub async fn load_feedbacks<B, F>(mut board: B, fetch: F)
where
    B: BoardHandle,
    F: Future<Output = Result<Vec<FeedbackEntry>, ApiError>>,
{
    let ticket = board.update(|b| b.begin_fetch());
    let res = fetch.await;
    let seq = board.update(|b| b.finish_fetch(ticket, res));
    expire_later(&mut board, seq).await;
}

/// One click on the submit control. `create` is only called when the
/// edit buffers pass validation and no other submission is in flight.
pub async fn submit_feedback<B, C, F>(mut board: B, create: C)
where
    B: BoardHandle,
    C: FnOnce(NewFeedback) -> F,
    F: Future<Output = Result<FeedbackEntry, ApiError>>,
{
    let started = board.update(|b| b.begin_submit());
    let seq = match started {
        Ok(draft) => {
            let res = create(draft).await;
            board.update(|b| b.finish_submit(res))
        }
        Err(err) => board.update(|b| b.report(&err)),
    };
    expire_later(&mut board, seq).await;
}

async fn expire_later<B: BoardHandle>(board: &mut B, seq: Option<u64>) {
    if let Some(seq) = seq {
        tokio::time::sleep(STATUS_TTL).await;
        board.update(|b| b.expire_status(seq));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FeedbackApi;
    use reqwest::StatusCode;
    use std::cell::{Cell, RefCell};
    use std::net::TcpListener;
    use std::rc::Rc;

    fn entry(id: i64, name: &str) -> FeedbackEntry {
        FeedbackEntry {
            id: EntryId::Number(id),
            name: name.to_string(),
            comment: format!("comment from {name}"),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn board_with(name: &str, comment: &str) -> FeedbackBoard {
        let mut board = FeedbackBoard::new();
        board.set_name(name);
        board.set_comment(comment);
        board
    }

    // Same sequence the component runs on a click.
    async fn submit(board: &mut FeedbackBoard, api: &FeedbackApi) -> Option<u64> {
        match board.begin_submit() {
            Ok(draft) => {
                let res = api.create(&draft).await;
                board.finish_submit(res)
            }
            Err(err) => board.report(&err),
        }
    }

    #[tokio::test]
    async fn test_blank_fields_never_reach_the_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/feedbacks")
            .expect(0)
            .create_async()
            .await;
        let api = FeedbackApi::new(&format!("{}/api", server.url())).unwrap();

        for (name, comment) in [("", ""), ("   ", "ok"), ("Ann", "\t\n"), ("", "ok"), ("Ann", "")] {
            let mut board = board_with(name, comment);
            let seq = submit(&mut board, &api).await;

            assert!(seq.is_some());
            let status = board.status().unwrap();
            assert_eq!(status.key, MSG_FILL_ALL_FIELDS);
            assert!(status.is_error());
            assert!(!board.is_loading());
            assert_eq!(board.name(), name);
            assert_eq!(board.comment(), comment);
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_successful_submit_prepends_and_clears_inputs() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/feedbacks")
            .with_status(201)
            .with_body(
                r#"{"id": 42, "name": "Ann", "comment": "Great!", "created_at": "2024-01-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;
        let api = FeedbackApi::new(&format!("{}/api", server.url())).unwrap();

        let mut board = board_with("Ann", "Great!");
        let ticket = board.begin_fetch();
        board.finish_fetch(ticket, Ok(vec![entry(1, "Old")]));

        submit(&mut board, &api).await;

        assert_eq!(board.entries()[0].id, EntryId::Number(42));
        assert_eq!(board.entries()[0].name, "Ann");
        assert_eq!(board.entries()[1].id, EntryId::Number(1));
        assert_eq!(board.name(), "");
        assert_eq!(board.comment(), "");
        assert!(!board.is_loading());
        let status = board.status().unwrap();
        assert_eq!(status.key, MSG_SUBMITTED);
        assert_eq!(status.kind, StatusKind::Success);
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_inputs() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/feedbacks")
            .with_status(422)
            .with_body(r#"{"error": "nope"}"#)
            .create_async()
            .await;
        let api = FeedbackApi::new(&format!("{}/api", server.url())).unwrap();

        let mut board = board_with("Ann", "Great!");
        submit(&mut board, &api).await;

        assert_eq!(board.name(), "Ann");
        assert_eq!(board.comment(), "Great!");
        assert!(board.entries().is_empty());
        assert!(!board.is_loading());
        assert_eq!(board.status().unwrap().key, MSG_SUBMIT_ERROR);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_submit_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = FeedbackApi::new(&format!("http://127.0.0.1:{port}/api")).unwrap();
        let mut board = board_with("Ann", "Great!");
        submit(&mut board, &api).await;

        assert_eq!(board.status().unwrap().key, MSG_SUBMIT_ERROR);
        assert_eq!(board.name(), "Ann");
    }

    #[tokio::test]
    async fn test_initial_fetch_keeps_response_order() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/feedbacks")
            .with_status(200)
            .with_body(
                r#"[
                    {"id": 1, "name": "Ann", "comment": "a", "created_at": "2024-01-01T00:00:00Z"},
                    {"id": 2, "name": "Bo", "comment": "b", "created_at": "2024-03-01T00:00:00Z"}
                ]"#,
            )
            .create_async()
            .await;
        let api = FeedbackApi::new(&format!("{}/api", server.url())).unwrap();

        let mut board = FeedbackBoard::new();
        let ticket = board.begin_fetch();
        let res = api.list().await;
        assert!(board.finish_fetch(ticket, res).is_none());

        let ids: Vec<&EntryId> = board.entries().iter().map(|e| &e.id).collect();
        assert_eq!(ids, vec![&EntryId::Number(1), &EntryId::Number(2)]);
        assert!(board.status().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_list_alone() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/feedbacks")
            .with_status(503)
            .create_async()
            .await;
        let api = FeedbackApi::new(&format!("{}/api", server.url())).unwrap();

        let mut board = FeedbackBoard::new();
        let ticket = board.begin_fetch();
        let res = api.list().await;
        assert!(board.finish_fetch(ticket, res).is_some());

        assert!(board.entries().is_empty());
        let status = board.status().unwrap();
        assert_eq!(status.key, MSG_LOAD_ERROR);
        assert!(status.is_error());
    }

    #[test]
    fn test_second_submit_refused_while_loading() {
        let mut board = board_with("Ann", "Great!");
        assert!(board.begin_submit().is_ok());
        assert!(board.is_loading());
        assert_eq!(board.phase, SubmitPhase::Submitting);

        let err = board.begin_submit().unwrap_err();
        assert!(matches!(err, FeedbackError::Busy));
        assert!(board.report(&err).is_none());
        assert!(board.status().is_none());

        board.finish_submit(Ok(entry(7, "Ann")));
        assert!(!board.is_loading());
        assert_eq!(board.entries().len(), 1);
    }

    #[test]
    fn test_draft_carries_untrimmed_input() {
        let mut board = board_with("  Ann ", "Great!\n");
        let draft = board.begin_submit().unwrap();
        assert_eq!(draft.name, "  Ann ");
        assert_eq!(draft.comment, "Great!\n");
    }

    #[derive(Clone, Default)]
    struct SharedBoard(Rc<RefCell<FeedbackBoard>>);

    impl BoardHandle for SharedBoard {
        fn update<R>(&mut self, f: impl FnOnce(&mut FeedbackBoard) -> R) -> R {
            f(&mut self.0.borrow_mut())
        }
    }

    impl SharedBoard {
        fn with(name: &str, comment: &str) -> Self {
            SharedBoard(Rc::new(RefCell::new(board_with(name, comment))))
        }

        fn status_key(&self) -> Option<&'static str> {
            self.0.borrow().status().map(|s| s.key)
        }
    }

    // Runs alongside a driver: the banner must be up just before the TTL
    // and gone just after it.
    async fn expect_banner_for_ttl(board: &SharedBoard, key: &'static str) {
        tokio::task::yield_now().await;
        assert_eq!(board.status_key(), Some(key));

        tokio::time::sleep(STATUS_TTL - Duration::from_millis(1)).await;
        assert_eq!(board.status_key(), Some(key));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(board.status_key(), None);
    }

    fn unavailable() -> ApiError {
        ApiError::status(StatusCode::SERVICE_UNAVAILABLE, "http://feedback.test/api/feedbacks")
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_banner_expires() {
        let board = SharedBoard::with("  ", "Great!");
        let called = Cell::new(false);

        tokio::join!(
            submit_feedback(board.clone(), |_| {
                called.set(true);
                async { Err::<FeedbackEntry, _>(unavailable()) }
            }),
            expect_banner_for_ttl(&board, MSG_FILL_ALL_FIELDS),
        );
        assert!(!called.get());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_banner_expires() {
        let board = SharedBoard::default();

        tokio::join!(
            load_feedbacks(board.clone(), async { Err::<Vec<FeedbackEntry>, _>(unavailable()) }),
            expect_banner_for_ttl(&board, MSG_LOAD_ERROR),
        );
        assert!(board.0.borrow().entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_banners_expire() {
        let board = SharedBoard::with("Ann", "Great!");
        tokio::join!(
            submit_feedback(board.clone(), |draft| async move {
                Ok(FeedbackEntry {
                    id: EntryId::Number(42),
                    name: draft.name,
                    comment: draft.comment,
                    created_at: "2024-01-01T00:00:00Z".to_string(),
                })
            }),
            expect_banner_for_ttl(&board, MSG_SUBMITTED),
        );
        assert_eq!(board.0.borrow().entries()[0].id, EntryId::Number(42));

        let board = SharedBoard::with("Ann", "Great!");
        tokio::join!(
            submit_feedback(board.clone(), |_| async { Err::<FeedbackEntry, _>(unavailable()) }),
            expect_banner_for_ttl(&board, MSG_SUBMIT_ERROR),
        );
        assert_eq!(board.0.borrow().name(), "Ann");
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_click_raises_nothing() {
        let mut board = SharedBoard::with("Ann", "Great!");
        board.update(|b| b.begin_submit()).unwrap();

        let start = tokio::time::Instant::now();
        submit_feedback(board.clone(), |_| async { Err::<FeedbackEntry, _>(unavailable()) }).await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(board.status_key(), None);
        assert!(board.0.borrow().is_loading());
    }

    #[test]
    fn test_local_copies_dropped_once_fetch_applied() {
        let mut board = FeedbackBoard::new();
        let ticket = board.begin_fetch();
        board.finish_fetch(ticket, Ok(vec![entry(1, "Old")]));

        for i in 0..100 {
            board.set_name("Ann");
            board.set_comment("Great!");
            board.begin_submit().unwrap();
            board.finish_submit(Ok(entry(100 + i, "Ann")));
        }

        assert!(board.local.is_empty());
        assert_eq!(board.entries().len(), 101);
    }

    #[test]
    fn test_local_copies_dropped_after_failed_fetch() {
        let mut board = board_with("Ann", "Great!");
        let ticket = board.begin_fetch();
        board.begin_submit().unwrap();
        board.finish_submit(Ok(entry(42, "Ann")));
        assert_eq!(board.local.len(), 1);

        board.finish_fetch(ticket, Err(unavailable()));
        assert!(board.local.is_empty());
        assert_eq!(board.entries().len(), 1);
    }

    #[test]
    fn test_stale_expiry_leaves_newer_status() {
        let mut board = board_with("Ann", "Great!");
        let first = board.report(&FeedbackError::Validation).unwrap();

        board.begin_submit().unwrap();
        let second = board.finish_submit(Ok(entry(1, "Ann"))).unwrap();
        assert_ne!(first, second);

        board.expire_status(first);
        assert_eq!(board.status().unwrap().key, MSG_SUBMITTED);

        board.expire_status(second);
        assert!(board.status().is_none());
    }

    #[test]
    fn test_submit_landing_before_fetch_survives() {
        let mut board = board_with("Ann", "Great!");
        let ticket = board.begin_fetch();

        board.begin_submit().unwrap();
        board.finish_submit(Ok(entry(42, "Ann")));

        // The list snapshot was taken before the POST reached the server.
        board.finish_fetch(ticket, Ok(vec![entry(1, "Old"), entry(2, "Older")]));

        let ids: Vec<&EntryId> = board.entries().iter().map(|e| &e.id).collect();
        assert_eq!(
            ids,
            vec![&EntryId::Number(42), &EntryId::Number(1), &EntryId::Number(2)]
        );
    }

    #[test]
    fn test_fetch_that_already_has_local_entry_does_not_duplicate() {
        let mut board = board_with("Ann", "Great!");
        let ticket = board.begin_fetch();

        board.begin_submit().unwrap();
        board.finish_submit(Ok(entry(42, "Ann")));

        board.finish_fetch(ticket, Ok(vec![entry(42, "Ann"), entry(1, "Old")]));

        let ids: Vec<&EntryId> = board.entries().iter().map(|e| &e.id).collect();
        assert_eq!(ids, vec![&EntryId::Number(42), &EntryId::Number(1)]);
    }

    #[test]
    fn test_older_fetch_is_dropped() {
        let mut board = FeedbackBoard::new();
        let older = board.begin_fetch();
        let newer = board.begin_fetch();

        board.finish_fetch(newer, Ok(vec![entry(2, "New"), entry(1, "Old")]));
        board.finish_fetch(older, Ok(vec![entry(1, "Old")]));

        assert_eq!(board.entries().len(), 2);
        assert_eq!(board.entries()[0].id, EntryId::Number(2));
    }
}
