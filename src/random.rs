//! Random sources threaded explicitly through rule application.
//!
//! Rules never reach for process-wide randomness. Every draw goes through a
//! `RandomSource` owned by the caller of a single generation run.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::error::{GrammarError, Result};

/// A source of uniform values in `[0, 1)`.
///
/// Only `next_unit` is required; every other draw is derived from it so a
/// scripted source controls rule outcomes exactly.
pub trait RandomSource {
    fn next_unit(&mut self) -> Result<f64>;

    /// Uniform value in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> Result<f64> {
        Ok(lo + self.next_unit()? * (hi - lo))
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> Result<bool> {
        Ok(self.next_unit()? < p)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> Result<usize> {
        let i = (self.next_unit()? * len as f64) as usize;
        Ok(i.min(len.saturating_sub(1)))
    }
}

impl RandomSource for ChaCha8Rng {
    fn next_unit(&mut self) -> Result<f64> {
        Ok(self.gen::<f64>())
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_unit(&mut self) -> Result<f64> {
        (**self).next_unit()
    }
}

/// A finite, replayable source for tests.
///
/// Yields the given values in order and fails with
/// [`GrammarError::RandomSourceExhausted`] once they run out.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// Values must lie in `[0, 1)`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            cursor: 0,
        }
    }

    pub fn consumed(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> Result<f64> {
        let value = self
            .values
            .get(self.cursor)
            .copied()
            .ok_or(GrammarError::RandomSourceExhausted {
                consumed: self.cursor,
            })?;
        if !(0.0..1.0).contains(&value) {
            return Err(GrammarError::Config(format!(
                "scripted random value {value} at position {} is outside [0, 1)",
                self.cursor
            )));
        }
        self.cursor += 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_scripted_source_replays_then_fails() {
        let mut src = ScriptedSource::new([0.25, 0.75]);
        assert_eq!(src.next_unit().unwrap(), 0.25);
        assert_eq!(src.range(10.0, 20.0).unwrap(), 17.5);
        assert_eq!(src.remaining(), 0);

        match src.next_unit() {
            Err(GrammarError::RandomSourceExhausted { consumed }) => assert_eq!(consumed, 2),
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_scripted_source_rejects_out_of_range() {
        let mut src = ScriptedSource::new([1.0]);
        assert!(matches!(src.next_unit(), Err(GrammarError::Config(_))));
    }

    #[test]
    fn test_index_stays_in_bounds() {
        let mut src = ScriptedSource::new([0.0, 0.999_999, 0.5]);
        assert_eq!(src.index(4).unwrap(), 0);
        assert_eq!(src.index(4).unwrap(), 3);
        assert_eq!(src.index(4).unwrap(), 2);
    }

    #[test]
    fn test_chacha_is_deterministic() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..16 {
            let x = a.next_unit().unwrap();
            assert!((0.0..1.0).contains(&x));
            assert_eq!(x, b.next_unit().unwrap());
        }
    }

    #[test]
    fn test_chance_boundary() {
        let mut src = ScriptedSource::new([0.2, 0.199]);
        assert!(!src.chance(0.2).unwrap());
        assert!(src.chance(0.2).unwrap());
    }
}
