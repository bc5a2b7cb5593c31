use crate::backend::{ChatBackend, ChatRequest, PhotoRequest};
use crate::chat::directive;
use crate::chat::transcript::{PhotoSlotState, RenderTarget, SlotId};
use crate::chat::{ConversationLog, Message, Role};
use crate::event::{PhotoOutcome, SessionEvent};
use crate::persona::Persona;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

pub type Notifier = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoOptions {
    pub style: Option<String>,
    pub pose: Option<String>,
}

/// One conversation with one persona.
///
/// All state lives on the thread that owns the session. Requests run on the tokio
/// runtime and report back through a channel; call [`ChatSession::drain_events`]
/// (or [`ChatSession::wait_event`]) from the owning thread to apply their results.
pub struct ChatSession<R: RenderTarget> {
    log: ConversationLog,
    target: R,
    persona: Persona,
    backend: Arc<dyn ChatBackend>,
    runtime: Handle,
    tx: Sender<SessionEvent>,
    rx: Receiver<SessionEvent>,
    notify: Option<Notifier>,
    photo_options: PhotoOptions,
    pending_chats: usize,
    pending_photos: usize,
}

impl<R: RenderTarget> ChatSession<R> {
    pub fn new(persona: Persona, backend: Arc<dyn ChatBackend>, runtime: Handle, target: R) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            log: ConversationLog::new(),
            target,
            persona,
            backend,
            runtime,
            tx,
            rx,
            notify: None,
            photo_options: PhotoOptions::default(),
            pending_chats: 0,
            pending_photos: 0,
        }
    }

    /// Called after every background result is queued, e.g. to wake the UI.
    pub fn with_notifier(mut self, notify: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify = Some(Arc::new(notify));
        self
    }

    pub fn with_photo_options(mut self, options: PhotoOptions) -> Self {
        self.photo_options = options;
        self
    }

    /// Shows the persona greeting. It becomes part of the history sent to the backend.
    pub fn start(&mut self) {
        let greeting = self.persona.greeting.clone();
        self.append_message(Role::Assistant, greeting);
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn pending_chats(&self) -> usize {
        self.pending_chats
    }

    pub fn pending_photos(&self) -> usize {
        self.pending_photos
    }

    /// Records a message and renders it. The log always grows by one, whatever is shown.
    pub fn append_message(&mut self, role: Role, content: impl Into<String>) {
        let content = content.into();
        let scanned = directive::scan(&content);
        self.log.push(Message::new(role, content));

        match scanned.photo {
            Some(description) => {
                if !scanned.visible_text.is_empty() {
                    self.target.push_text(role, &scanned.visible_text);
                }
                let slot = self.target.open_photo_slot(role);
                self.resolve_photo(&description, slot);
            }
            None => self.target.push_text(role, &scanned.visible_text),
        }
    }

    /// Returns `false` without side effects when `text` is blank.
    pub fn send_user_message(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        self.append_message(Role::User, text);
        let request = ChatRequest {
            girl_id: self.persona.id.clone(),
            messages: self.log.messages().to_vec(),
        };
        self.pending_chats += 1;

        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let notify = self.notify.clone();
        self.runtime.spawn(async move {
            let event = match backend.chat(&request).await {
                Ok(reply) => SessionEvent::ChatReplied(reply),
                Err(err) => SessionEvent::ChatFailed(err),
            };
            deliver(&tx, notify.as_ref(), event);
        });

        true
    }

    pub fn resolve_photo(&mut self, description: &str, slot: SlotId) {
        self.target.update_photo_slot(slot, PhotoSlotState::Loading);
        let request = PhotoRequest {
            girl_id: self.persona.id.clone(),
            prompt: self.persona.photo_prompt_for(description),
            style: self.photo_options.style.clone(),
            pose: self.photo_options.pose.clone(),
        };
        self.pending_photos += 1;

        let backend = Arc::clone(&self.backend);
        let completion = PhotoCompletion {
            slot,
            tx: self.tx.clone(),
            notify: self.notify.clone(),
            delivered: false,
        };
        self.runtime.spawn(async move {
            let outcome = PhotoOutcome::from_result(backend.photo(&request).await);
            completion.finish(outcome);
        });
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ChatReplied(reply) => {
                self.pending_chats = self.pending_chats.saturating_sub(1);
                self.append_message(Role::Assistant, reply);
            }
            SessionEvent::ChatFailed(err) => {
                self.pending_chats = self.pending_chats.saturating_sub(1);
                log::warn!("chat request failed: {err}");
                let fallback = self.persona.fallback_reply.clone();
                self.append_message(Role::Assistant, fallback);
            }
            SessionEvent::PhotoFinished { slot, outcome } => {
                self.pending_photos = self.pending_photos.saturating_sub(1);
                self.target.update_photo_slot(slot, outcome.into());
            }
        }
    }

    /// Applies every queued result without blocking. Returns how many were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Blocks up to `timeout` for one result and applies it.
    pub fn wait_event(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

fn deliver(tx: &Sender<SessionEvent>, notify: Option<&Notifier>, event: SessionEvent) {
    if tx.send(event).is_err() {
        log::debug!("session dropped before a background result arrived");
        return;
    }
    if let Some(notify) = notify {
        notify();
    }
}

/// Reports exactly one outcome for a photo slot. A task that is dropped before
/// finishing reports `Failed`, so the loading indicator never outlives its request.
struct PhotoCompletion {
    slot: SlotId,
    tx: Sender<SessionEvent>,
    notify: Option<Notifier>,
    delivered: bool,
}

impl PhotoCompletion {
    fn finish(mut self, outcome: PhotoOutcome) {
        self.send(outcome);
    }

    fn send(&mut self, outcome: PhotoOutcome) {
        self.delivered = true;
        let event = SessionEvent::PhotoFinished {
            slot: self.slot,
            outcome,
        };
        deliver(&self.tx, self.notify.as_ref(), event);
    }
}

impl Drop for PhotoCompletion {
    fn drop(&mut self) {
        if !self.delivered {
            self.send(PhotoOutcome::Failed);
        }
    }
}
