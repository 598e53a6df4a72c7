// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The record of every position a game has passed through, with a cursor that can be walked backwards and forwards
//! over it.
//!
//! Nodes live in a single arena and refer to each other by index. Recording a move while the cursor is not at the
//! newest node throws away everything after the cursor, so the arena is always one linear chain in index order.

use std::collections::HashMap;

use crate::{core::Move, position::Position};

/// Index of a node in a `HistoryLog`.
pub type NodeId = usize;

/// Number of occurrences of each repetition key.
pub type RepetitionTable = HashMap<String, u32>;

#[derive(Clone, Debug)]
pub struct HistoryNode {
    /// The position after `mov` was played.
    pub position: Position,
    /// The move that produced `position`, or `None` for the initial position.
    pub mov: Option<Move>,
    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub struct HistoryLog {
    nodes: Vec<HistoryNode>,
    cursor: NodeId,
}

impl HistoryLog {
    /// Creates a log holding only the initial position, with the cursor on it.
    pub fn new(initial: Position) -> HistoryLog {
        HistoryLog {
            nodes: vec![HistoryNode {
                position: initial,
                mov: None,
                parent: None,
                child: None,
            }],
            cursor: 0,
        }
    }

    /// Appends a position after the cursor and moves the cursor onto it. Any nodes that were ahead of the cursor are
    /// discarded first.
    pub fn record(&mut self, position: Position, mov: Move) -> NodeId {
        self.nodes.truncate(self.cursor + 1);
        let id = self.nodes.len();
        self.nodes[self.cursor].child = Some(id);
        self.nodes.push(HistoryNode {
            position,
            mov: Some(mov),
            parent: Some(self.cursor),
            child: None,
        });
        self.cursor = id;
        id
    }

    /// Steps the cursor forward to the child of the current node. Returns the new current position, or `None` if
    /// there is nothing ahead.
    pub fn advance(&mut self) -> Option<&Position> {
        let child = self.nodes[self.cursor].child?;
        self.cursor = child;
        Some(&self.nodes[child].position)
    }

    /// Steps the cursor back to the parent of the current node. Returns the new current position, or `None` if the
    /// cursor is already at the initial position.
    pub fn retreat(&mut self) -> Option<&Position> {
        let parent = self.nodes[self.cursor].parent?;
        self.cursor = parent;
        Some(&self.nodes[parent].position)
    }

    pub fn has_next(&self) -> bool {
        self.nodes[self.cursor].child.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.nodes[self.cursor].parent.is_some()
    }

    pub fn current(&self) -> &Position {
        &self.nodes[self.cursor].position
    }

    /// The move that led to the current position.
    pub fn current_move(&self) -> Option<Move> {
        self.nodes[self.cursor].mov
    }

    pub fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// Number of nodes in the log, including any ahead of the cursor.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&HistoryNode> {
        self.nodes.get(id)
    }

    /// Walks from the initial position to the cursor, yielding each node on the way.
    fn path(&self) -> impl Iterator<Item = &HistoryNode> + '_ {
        self.nodes[..=self.cursor].iter()
    }

    /// Counts how often each repetition key occurs between the initial position and the cursor, inclusive. Nodes
    /// ahead of the cursor are not part of the game being played and are not counted.
    pub fn repetitions(&self) -> RepetitionTable {
        let mut table = RepetitionTable::new();
        for node in self.path() {
            *table.entry(node.position.repetition_key()).or_insert(0) += 1;
        }
        table
    }

    /// Number of times `key` occurs between the initial position and the cursor, inclusive.
    pub fn repetition_count(&self, key: &str) -> u32 {
        self.path()
            .filter(|node| node.position.repetition_key() == key)
            .count() as u32
    }
}
