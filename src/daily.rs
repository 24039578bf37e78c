//! # Daily Pokémon Selection
//!
//! Maps a calendar date to a Pokédex number in `[1, max_id]`. The mapping is a
//! pure function of the date: no clock reads, no process-wide seed, so every
//! widget instance (and every restart) agrees on the Pokémon of the day.
//!
//! ## Algorithm
//!
//! 1. **Day index**: signed days between the date and 1970-01-01. Only the
//!    calendar date matters, not the instant or the evaluating time zone.
//! 2. **Mix**: `seed = days * 1_103_515_245 + 12_345_678_901`, an LCG-style
//!    multiply-add that spreads adjacent days far apart in seed space.
//! 3. **Generate**: seed an [`XorWowRng`], burn [`BURN_IN`] outputs.
//! 4. **Reduce**: draw from `[1, max_id]` by reject-and-retry, so ranges that do
//!    not divide 2³¹ evenly are not biased toward low ids.
//!
//! Known values for `MAX_ID = 1025`: 1970-01-01 → 755, 2024-01-01 → 528,
//! 2024-01-02 → 425.

use chrono::NaiveDate;
use rand::RngCore;
use thiserror::Error;

/// Highest Pokédex number included in the daily rotation.
pub const MAX_ID: u32 = 1025;

/// Largest accepted `max_id`; the bounded draw works on positive `i32` spans.
pub const MAX_SUPPORTED_ID: u32 = i32::MAX as u32;

/// Multiplier of the day-index mixing step.
const MIX_MULTIPLIER: i64 = 1_103_515_245;

/// Increment of the day-index mixing step.
const MIX_INCREMENT: i64 = 12_345_678_901;

/// Generator outputs discarded before the draw.
const BURN_IN: usize = 5;

/// Errors from daily selection.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    /// `max_id` must be in `1..=MAX_SUPPORTED_ID`
    #[error("invalid max id {0}: must be between 1 and {MAX_SUPPORTED_ID}")]
    InvalidMaxId(u32),
}

/// Pick the Pokédex number for `date` from `[1, max_id]`.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use pokemon_matrix_lib::daily::{select_id, MAX_ID};
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// assert_eq!(select_id(date, MAX_ID).unwrap(), 528);
/// ```
pub fn select_id(date: NaiveDate, max_id: u32) -> Result<u32, SelectError> {
    check_max_id(max_id)?;

    let seed = days_since_epoch(date)
        .wrapping_mul(MIX_MULTIPLIER)
        .wrapping_add(MIX_INCREMENT);

    let mut rng = XorWowRng::from_seed_i64(seed);
    for _ in 0..BURN_IN {
        rng.next_u32();
    }

    rng.next_in_range(1, max_id)
        .ok_or(SelectError::InvalidMaxId(max_id))
}

/// Reject a rotation size [`select_id`] cannot draw from uniformly.
pub fn check_max_id(max_id: u32) -> Result<(), SelectError> {
    if (1..=MAX_SUPPORTED_ID).contains(&max_id) {
        Ok(())
    } else {
        Err(SelectError::InvalidMaxId(max_id))
    }
}

/// Signed day count from 1970-01-01.
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
    date.signed_duration_since(epoch).num_days()
}

/// Marsaglia's xorwow generator with a Weyl-sequence addend.
///
/// Seeded from a 64-bit value split into two 32-bit halves. The first 64
/// outputs are discarded on construction because trivial seeds (small day
/// counts, zero halves) otherwise produce several values with zero upper bits.
#[derive(Clone, Debug)]
pub struct XorWowRng {
    x: u32,
    y: u32,
    z: u32,
    w: u32,
    v: u32,
    addend: u32,
}

impl XorWowRng {
    /// Weyl sequence step
    const WEYL: u32 = 362_437;

    /// Build a generator from two seed words.
    pub fn new(seed1: u32, seed2: u32) -> Self {
        let mut rng = Self {
            x: seed1,
            y: seed2,
            z: 0,
            w: 0,
            v: !seed1,
            addend: (seed1 << 10) ^ (seed2 >> 4),
        };
        for _ in 0..64 {
            rng.next_u32();
        }
        rng
    }

    /// Build a generator from a signed 64-bit seed (low word, arithmetic high word).
    pub fn from_seed_i64(seed: i64) -> Self {
        Self::new(seed as u32, (seed >> 32) as u32)
    }

    fn step(&mut self) -> u32 {
        let mut t = self.x;
        t ^= t >> 2;
        self.x = self.y;
        self.y = self.z;
        self.z = self.w;
        let v0 = self.v;
        self.w = v0;
        t = (t ^ (t << 1)) ^ v0 ^ (v0 << 4);
        self.v = t;
        self.addend = self.addend.wrapping_add(Self::WEYL);
        t.wrapping_add(self.addend)
    }

    /// Uniform draw from the inclusive range `[low, high]`.
    ///
    /// Power-of-two spans take the top bits of one output. Other spans use
    /// 31-bit outputs and retry when the draw falls in the incomplete final
    /// bucket. `None` when `high < low` or the span does not fit in an `i32`.
    fn next_in_range(&mut self, low: u32, high: u32) -> Option<u32> {
        let n = high
            .checked_sub(low)?
            .checked_add(1)
            .and_then(|span| i32::try_from(span).ok())?;

        if n & n.wrapping_neg() == n {
            let bit_count = 31 - n.leading_zeros();
            let bits = self.step();
            let value = if bit_count == 0 { 0 } else { bits >> (32 - bit_count) };
            return Some(low + value);
        }

        loop {
            let bits = (self.step() >> 1) as i32;
            let value = bits % n;
            if bits.wrapping_sub(value).wrapping_add(n - 1) >= 0 {
                return Some(low + value as u32);
            }
        }
    }
}

impl RngCore for XorWowRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.step());
        let low = u64::from(self.step());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
