use crate::api::types::Analysis;

/// Which side of the current card is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFace {
    Front,
    Back,
}

/// Study position within one analysis's flashcard list.
///
/// A deck over zero cards is a distinct `Empty` state, never an out-of-range
/// index. There is no terminal "finished" state; the deck is browsable back
/// and forth indefinitely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeckSession {
    Empty {
        analysis_id: String,
    },
    Active {
        analysis_id: String,
        card_count: usize,
        index: usize,
        face: CardFace,
    },
}

impl DeckSession {
    pub fn open(analysis: &Analysis) -> Self {
        if analysis.flashcards.is_empty() {
            DeckSession::Empty {
                analysis_id: analysis.id.clone(),
            }
        } else {
            DeckSession::Active {
                analysis_id: analysis.id.clone(),
                card_count: analysis.flashcards.len(),
                index: 0,
                face: CardFace::Front,
            }
        }
    }

    pub fn analysis_id(&self) -> &str {
        match self {
            DeckSession::Empty { analysis_id } | DeckSession::Active { analysis_id, .. } => {
                analysis_id
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DeckSession::Empty { .. })
    }

    pub fn card_count(&self) -> usize {
        match self {
            DeckSession::Empty { .. } => 0,
            DeckSession::Active { card_count, .. } => *card_count,
        }
    }

    /// Current card index; `None` for an empty deck.
    pub fn index(&self) -> Option<usize> {
        match self {
            DeckSession::Empty { .. } => None,
            DeckSession::Active { index, .. } => Some(*index),
        }
    }

    pub fn revealed(&self) -> bool {
        matches!(
            self,
            DeckSession::Active {
                face: CardFace::Back,
                ..
            }
        )
    }

    /// `Front -> Back`. No-op on the back side or an empty deck.
    pub fn reveal(&mut self) {
        if let DeckSession::Active { face, .. } = self {
            *face = CardFace::Back;
        }
    }

    /// Any state `-> Front`. Idempotent.
    pub fn reset(&mut self) {
        if let DeckSession::Active { face, .. } = self {
            *face = CardFace::Front;
        }
    }

    /// Advance one card, clamped to the last index; always lands on `Front`.
    pub fn next(&mut self) {
        if let DeckSession::Active {
            card_count,
            index,
            face,
            ..
        } = self
        {
            *index = (*index + 1).min(*card_count - 1);
            *face = CardFace::Front;
        }
    }

    /// Step back one card, clamped to zero; always lands on `Front`.
    pub fn previous(&mut self) {
        if let DeckSession::Active { index, face, .. } = self {
            *index = index.saturating_sub(1);
            *face = CardFace::Front;
        }
    }
}
