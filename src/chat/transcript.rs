use crate::chat::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSlotState {
    Reserved,
    Loading,
    Resolved { url: String },
    Unavailable,
    Failed,
}

impl PhotoSlotState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Resolved { .. } | Self::Unavailable | Self::Failed
        )
    }
}

/// Where a session draws its messages.
pub trait RenderTarget {
    fn push_text(&mut self, role: Role, text: &str);

    /// Reserves a place for a photo, independent of any text block.
    fn open_photo_slot(&mut self, role: Role) -> SlotId;

    fn update_photo_slot(&mut self, slot: SlotId, state: PhotoSlotState);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Text {
        role: Role,
        text: String,
    },
    Photo {
        role: Role,
        slot: SlotId,
        state: PhotoSlotState,
    },
}

/// In-memory render target read by the desktop view.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    slots: Vec<usize>,
    revision: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Bumped on every visible change; the view uses it to decide when to scroll.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn photo_state(&self, slot: SlotId) -> Option<&PhotoSlotState> {
        let index = *self.slots.get(slot.index())?;
        match self.entries.get(index) {
            Some(TranscriptEntry::Photo { state, .. }) => Some(state),
            _ => None,
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = (Role, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            TranscriptEntry::Text { role, text } => Some((*role, text.as_str())),
            TranscriptEntry::Photo { .. } => None,
        })
    }
}

impl RenderTarget for Transcript {
    fn push_text(&mut self, role: Role, text: &str) {
        self.entries.push(TranscriptEntry::Text {
            role,
            text: text.to_string(),
        });
        self.revision += 1;
    }

    fn open_photo_slot(&mut self, role: Role) -> SlotId {
        let slot = SlotId(self.slots.len());
        self.slots.push(self.entries.len());
        self.entries.push(TranscriptEntry::Photo {
            role,
            slot,
            state: PhotoSlotState::Reserved,
        });
        self.revision += 1;
        slot
    }

    fn update_photo_slot(&mut self, slot: SlotId, next: PhotoSlotState) {
        let Some(index) = self.slots.get(slot.index()).copied() else {
            log::warn!("update for unknown photo slot {}", slot.index());
            return;
        };
        let Some(TranscriptEntry::Photo { state, .. }) = self.entries.get_mut(index) else {
            return;
        };
        if state.is_terminal() {
            log::warn!(
                "ignoring late update for photo slot {}: already {:?}",
                slot.index(),
                state
            );
            return;
        }
        *state = next;
        self.revision += 1;
    }
}
