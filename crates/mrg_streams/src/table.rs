//! Lane state tables.
//!
//! A table holds the ordered lane states of one allocated stream variable:
//! lane `j` is substream `j` of the variable's stream. Lane order is
//! stable for the lifetime of the variable (the batched sampler relies on
//! it for the lane-major output interleave) and the table is only ever
//! replaced as a whole after a draw, never mutated lane-by-lane in place.

use mrg_core::{advance_substream, StateVector};

/// One lane: an independent generator state plus its logical coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lane {
    state: StateVector,
    stream: u64,
    substream: u64,
}

impl Lane {
    /// The lane's current generator state.
    #[inline]
    pub fn state(&self) -> StateVector {
        self.state
    }

    /// The lane's `(stream, substream)` coordinate.
    #[inline]
    pub fn coordinate(&self) -> (u64, u64) {
        (self.stream, self.substream)
    }
}

/// The ordered lane collection of one allocated stream variable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateTable {
    lanes: Vec<Lane>,
    stream: u64,
    /// State of the next substream to be derived; growth continues here.
    cursor: StateVector,
    next_substream: u64,
}

impl StateTable {
    /// Derives a table of `n_lanes` consecutive substreams of `base`.
    ///
    /// Lane 0 is `base` itself (substream 0); each further lane is one
    /// substream jump ahead of the previous.
    pub fn derive(base: StateVector, stream: u64, n_lanes: usize) -> Self {
        let mut lanes = Vec::with_capacity(n_lanes);
        let mut state = base;
        for substream in 0..n_lanes as u64 {
            lanes.push(Lane {
                state,
                stream,
                substream,
            });
            state = advance_substream(&state);
        }
        Self {
            lanes,
            stream,
            cursor: state,
            next_substream: n_lanes as u64,
        }
    }

    /// Extends the table by continuing its substream enumeration.
    ///
    /// Existing lanes keep their states untouched; the new lanes start at
    /// the stored cursor, exactly where [`StateTable::derive`] with a
    /// larger count would have put them.
    pub fn grow(&mut self, additional: usize) {
        self.lanes.reserve(additional);
        for _ in 0..additional {
            self.lanes.push(Lane {
                state: self.cursor,
                stream: self.stream,
                substream: self.next_substream,
            });
            self.cursor = advance_substream(&self.cursor);
            self.next_substream += 1;
        }
    }

    /// Number of lanes.
    #[inline]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Whether the table has no lanes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// The stream index this table's lanes subdivide.
    #[inline]
    pub fn stream(&self) -> u64 {
        self.stream
    }

    /// The lanes in order.
    #[inline]
    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// Builds the successor table after a draw: the first
    /// `advanced.len()` lanes take their advanced states, later lanes and
    /// the growth cursor carry over unchanged.
    pub(crate) fn replaced(&self, advanced: Vec<StateVector>) -> Self {
        debug_assert!(advanced.len() <= self.lanes.len());
        let mut lanes = self.lanes.clone();
        for (lane, state) in lanes.iter_mut().zip(advanced) {
            lane.state = state;
        }
        Self {
            lanes,
            stream: self.stream,
            cursor: self.cursor,
            next_substream: self.next_substream,
        }
    }
}
