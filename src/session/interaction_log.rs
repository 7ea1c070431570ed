// Interaction log: the ordered (query, response) record of one session
//
// Insertion order is preserved and nothing is deduplicated. There is no size
// cap; a long-running session grows without bound.

use serde::{Deserialize, Serialize};

/// One query/response pair. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    query: String,
    response: String,
}

impl Turn {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn response(&self) -> &str {
        &self.response
    }
}

/// Tabular view of a turn, with the column names used by every exporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub user_query: String,
    pub assistant_response: String,
}

impl From<&Turn> for TableRow {
    fn from(turn: &Turn) -> Self {
        Self {
            user_query: turn.query.clone(),
            assistant_response: turn.response.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    turns: Vec<Turn>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, query: &str, response: &str) {
        self.turns.push(Turn::new(query, response));
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn to_table(&self) -> Vec<TableRow> {
        self.turns.iter().map(TableRow::from).collect()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
