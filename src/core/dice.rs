//! Shared random source for rolls
//!
//! Every random draw on the resolution path goes through a [`RandomProvider`]
//! so a session seeded with the same value replays identically.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Upper bound on re-rolls for a single open-ended draw
pub const MAX_OPEN_ENDED_REROLLS: u32 = 8;

/// Uniform and die-style draws
pub trait RandomProvider {
    /// Uniform integer in `[lo, hi]` (inclusive). `hi < lo` returns `lo`.
    fn uniform(&mut self, lo: i32, hi: i32) -> i32;

    /// Natural d20
    fn d20(&mut self) -> i32 {
        self.uniform(1, 20)
    }

    /// Open-ended draw: roll `1..=size`, rolling again and adding while the
    /// maximum comes up. `size` below 1 is treated as 1.
    fn open_ended(&mut self, size: i32) -> i32 {
        let size = size.max(1);
        let mut total = 0;
        for _ in 0..=MAX_OPEN_ENDED_REROLLS {
            let draw = self.uniform(1, size);
            total += draw;
            if draw < size || size == 1 {
                break;
            }
        }
        total
    }
}

/// Seedable ChaCha-backed dice
#[derive(Debug, Clone)]
pub struct SeededDice {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewind to the initial seed
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}

impl RandomProvider for SeededDice {
    fn uniform(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}

/// Replays a fixed sequence of draws
///
/// Each draw pops the next scripted value and clamps it into the requested
/// range. Once the script runs dry every draw returns the range minimum.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    values: VecDeque<i32>,
}

impl ScriptedDice {
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn push(&mut self, value: i32) {
        self.values.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomProvider for ScriptedDice {
    fn uniform(&mut self, lo: i32, hi: i32) -> i32 {
        let hi = hi.max(lo);
        self.values.pop_front().map_or(lo, |v| v.clamp(lo, hi))
    }
}
