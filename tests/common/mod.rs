//! Common test utilities
//!
//! In-memory stand-ins for every external collaborator plus a harness that
//! wires them into a real [`Router`], so tests drive the production handlers.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use teloxide::types::{ChatId, UserId};

use textgate::core::config::RequiredChats;
use textgate::core::error::{AppError, AppResult};
use textgate::services::{FileSource, MembershipOracle, OcrEngine, SpeechEngine, Translator};
use textgate::session::SessionStore;
use textgate::telegram::router::Deadlines;
use textgate::telegram::{Event, HandlerContext, Outbox, Reply, Request, Router};

pub const CHANNEL: ChatId = ChatId(-100_111);
pub const GROUP: ChatId = ChatId(-100_222);

pub fn test_chats() -> RequiredChats {
    RequiredChats {
        channel_id: CHANNEL,
        group_id: GROUP,
        channel_link: "https://t.me/test_channel".parse().unwrap(),
        group_link: "https://t.me/test_group".parse().unwrap(),
    }
}

/// Short deadlines so timeout tests stay fast.
pub fn test_deadlines() -> Deadlines {
    let short = Duration::from_millis(200);
    Deadlines {
        membership: short,
        download: short,
        ocr: short,
        tts: short,
        translate: short,
    }
}

async fn simulated_latency(delay_ms: &AtomicU64) {
    let ms = delay_ms.load(Ordering::SeqCst);
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[derive(Default)]
pub struct FakeMembership {
    members: Mutex<HashSet<(i64, u64)>>,
    failing: AtomicBool,
    delay_ms: AtomicU64,
    calls: AtomicUsize,
}

impl FakeMembership {
    pub fn join(&self, chat: ChatId, user: u64) {
        self.members.lock().unwrap().insert((chat.0, user));
    }

    pub fn join_both(&self, user: u64) {
        self.join(CHANNEL, user);
        self.join(GROUP, user);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Individual chat lookups, two per membership check.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipOracle for FakeMembership {
    async fn is_member(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        simulated_latency(&self.delay_ms).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "bot api unavailable",
            )));
        }
        Ok(self.members.lock().unwrap().contains(&(chat_id.0, user_id.0)))
    }
}

#[derive(Default)]
pub struct FakeFiles {
    files: Mutex<HashMap<String, Vec<u8>>>,
    requested: Mutex<Vec<String>>,
}

impl FakeFiles {
    pub fn put(&self, file_id: &str, bytes: &[u8]) {
        self.files.lock().unwrap().insert(file_id.to_string(), bytes.to_vec());
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSource for FakeFiles {
    async fn download(&self, file_id: &str) -> AppResult<Vec<u8>> {
        self.requested.lock().unwrap().push(file_id.to_string());
        self.files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("unknown file {}", file_id)))
    }
}

/// Treats the "image" bytes as the text printed on it; `!fail` makes recognition fail.
#[derive(Default)]
pub struct FakeOcr {
    delay_ms: AtomicU64,
    calls: AtomicUsize,
}

impl FakeOcr {
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn recognize(&self, image: &[u8]) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        simulated_latency(&self.delay_ms).await;
        if image == b"!fail" {
            return Err(AppError::Ocr("engine crashed".to_string()));
        }
        Ok(String::from_utf8_lossy(image).into_owned())
    }
}

/// Produces `MP3:<lang>:<text>` so each reply can be traced back to its input.
#[derive(Default)]
pub struct FakeSpeech {
    delay_ms: AtomicU64,
    calls: AtomicUsize,
}

impl FakeSpeech {
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechEngine for FakeSpeech {
    async fn synthesize(&self, text: &str, language: &str) -> AppResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        simulated_latency(&self.delay_ms).await;
        Ok(format!("MP3:{}:{}", language, text).into_bytes())
    }
}

/// Produces `[<target>] <text>`.
#[derive(Default)]
pub struct FakeTranslator {
    failing: AtomicBool,
    delay_ms: AtomicU64,
    calls: AtomicUsize,
}

impl FakeTranslator {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        simulated_latency(&self.delay_ms).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Translation("service unavailable".to_string()));
        }
        Ok(format!("[{}] {}", target_language, text))
    }
}

/// Keeps every reply in order.
#[derive(Default)]
pub struct RecordingOutbox {
    replies: Mutex<Vec<Reply>>,
}

impl RecordingOutbox {
    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Outbox for RecordingOutbox {
    async fn send(&self, reply: Reply) -> AppResult<()> {
        self.replies.lock().unwrap().push(reply);
        Ok(())
    }
}

pub struct Harness {
    pub router: Router,
    pub membership: Arc<FakeMembership>,
    pub files: Arc<FakeFiles>,
    pub ocr: Arc<FakeOcr>,
    pub speech: Arc<FakeSpeech>,
    pub translator: Arc<FakeTranslator>,
}

impl Harness {
    pub fn new() -> Self {
        let membership = Arc::new(FakeMembership::default());
        let files = Arc::new(FakeFiles::default());
        let ocr = Arc::new(FakeOcr::default());
        let speech = Arc::new(FakeSpeech::default());
        let translator = Arc::new(FakeTranslator::default());

        let mut ctx = HandlerContext::new(
            test_chats(),
            membership.clone(),
            files.clone(),
            ocr.clone(),
            speech.clone(),
            translator.clone(),
        );
        ctx.sessions = SessionStore::new(1_000, Duration::from_secs(3600));
        ctx.deadlines = test_deadlines();
        ctx.tts_language = "en".to_string();

        Self {
            router: Router::with_default_handlers(ctx),
            membership,
            files,
            ocr,
            speech,
            translator,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.router.context().sessions
    }

    /// Marks `user` verified without going through the join flow.
    pub async fn verified_user(&self, user: u64) -> u64 {
        self.sessions().mark_verified(UserId(user)).await;
        user
    }

    /// Dispatches one event from `user` in their private chat and returns the replies.
    pub async fn send(&self, user: u64, event: Event) -> Vec<Reply> {
        let outbox = RecordingOutbox::default();
        let req = Request::new(UserId(user), ChatId(user as i64), event);
        self.router.dispatch(req, &outbox).await;
        outbox.replies()
    }
}

/// Text of every text reply, audio skipped.
pub fn texts(replies: &[Reply]) -> Vec<String> {
    replies.iter().filter_map(|r| r.text().map(str::to_string)).collect()
}
