//! The card deck: a flat projection of processed emails plus a cursor

use crate::backend::{Email, Event, Todo};
use crate::config::CardOrder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardKind {
    Todo(Todo),
    Event(Event),
    /// Trailing "view the original email" card
    Original,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub email_id: String,
    pub subject: String,
    pub kind: CardKind,
}

impl Card {
    fn new(email: &Email, kind: CardKind) -> Self {
        Self {
            email_id: email.id().to_string(),
            subject: email.display_subject().to_string(),
            kind,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            CardKind::Todo(_) => "TODO",
            CardKind::Event(_) => "EVENT",
            CardKind::Original => "EMAIL",
        }
    }
}

/// Build the deck for a fetch result.
///
/// Per email, in input order: its extracted items in `order`, then one
/// `Original` card.
pub fn flatten(emails: &[Email], order: CardOrder) -> Vec<Card> {
    let mut cards = Vec::new();
    for email in emails {
        let todos = email
            .todos
            .iter()
            .map(|t| Card::new(email, CardKind::Todo(t.clone())));
        let events = email
            .events
            .iter()
            .map(|e| Card::new(email, CardKind::Event(e.clone())));

        match order {
            CardOrder::EventsFirst => {
                cards.extend(events);
                cards.extend(todos);
            }
            CardOrder::TodosFirst => {
                cards.extend(todos);
                cards.extend(events);
            }
        }
        cards.push(Card::new(email, CardKind::Original));
    }
    cards
}

/// Which edge the next card slides in from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// What the user did with a card during this session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
    index: usize,
    direction: Direction,
    /// Local only; parallel to `cards`
    decisions: Vec<Option<Decision>>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        let decisions = vec![None; cards.len()];
        Self {
            cards,
            index: 0,
            direction: Direction::Forward,
            decisions,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn current(&self) -> Option<&Card> {
        self.cards.get(self.index)
    }

    pub fn current_decision(&self) -> Option<Decision> {
        self.decisions.get(self.index).copied().flatten()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.cards.len()
    }

    /// Move to the next card. Returns false at the last card.
    pub fn advance(&mut self) -> bool {
        if self.index + 1 >= self.cards.len() {
            return false;
        }
        self.index += 1;
        self.direction = Direction::Forward;
        true
    }

    /// Move to the previous card. Returns false at the first card.
    pub fn retreat(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.direction = Direction::Backward;
        true
    }

    pub fn decide(&mut self, decision: Decision) {
        if let Some(slot) = self.decisions.get_mut(self.index) {
            *slot = Some(decision);
        }
    }

    pub fn decided_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.is_some()).count()
    }
}
