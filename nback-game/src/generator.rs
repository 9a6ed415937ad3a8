use nback_core::config::positive;
use nback_core::{ConfigError, GameConfiguration, Stimulus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

/// Share of eligible positions (`index >= n`) turned into matches.
pub const DEFAULT_MATCH_PERCENT: u8 = 30;

/// Stimuli for one game, fixed once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sequence {
    values: Vec<Stimulus>,
    grid_size: u8,
}

impl Sequence {
    /// Builds a sequence from explicit values, e.g. to replay a game.
    pub fn new(values: impl IntoIterator<Item = u8>, grid_size: u8) -> Result<Self, ConfigError> {
        let values = values
            .into_iter()
            .map(|v| Stimulus::new(v, grid_size))
            .collect::<Result<Vec<_>, _>>()?;
        positive("event_count", values.len() as i64)?;
        Ok(Self { values, grid_size })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Stimulus> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[Stimulus] {
        &self.values
    }

    pub fn grid_size(&self) -> u8 {
        self.grid_size
    }

    /// Whether `index` repeats the stimulus `n` steps earlier.
    pub fn is_match(&self, index: usize, n: usize) -> bool {
        n > 0 && index >= n && index < self.values.len() && self.values[index] == self.values[index - n]
    }

    pub fn match_count(&self, n: usize) -> usize {
        (0..self.values.len()).filter(|&i| self.is_match(i, n)).count()
    }
}

/// Number of matches a generated sequence carries: `percent` of the eligible
/// positions, rounded, and never fewer than one.
pub fn expected_matches(event_count: usize, n: usize, percent: u8) -> usize {
    let eligible = event_count.saturating_sub(n);
    if eligible == 0 {
        return 0;
    }
    let target = (eligible * usize::from(percent) + 50) / 100;
    target.clamp(1, eligible)
}

/// Produces N-back sequences with an exact number of planted matches.
///
/// Positions that are not planted never repeat the value `n` steps back, so
/// the only matches are the planted ones. Unplanted positions also try to
/// differ from their neighbours, falling back to any non-matching value when
/// the domain is too small for that.
#[derive(Debug, Clone)]
pub struct SequenceGenerator<R: Rng> {
    rng: R,
    match_percent: u8,
}

impl SequenceGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }
}

impl<R: Rng> SequenceGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            match_percent: DEFAULT_MATCH_PERCENT,
        }
    }

    pub fn with_match_percent(mut self, percent: u8) -> Self {
        self.match_percent = percent.min(100);
        self
    }

    pub fn match_percent(&self) -> u8 {
        self.match_percent
    }

    /// Sequence of `config.event_count` stimuli for an `n_back` game.
    pub fn generate(&mut self, config: &GameConfiguration) -> Result<Sequence, ConfigError> {
        config.validate_for_generation()?;
        let grid_size = config.grid_size;
        let n_back = config.n_back;
        let len = config.event_count as usize;
        let n = n_back as usize;
        let planted = expected_matches(len, n, self.match_percent);

        let mut is_target = vec![false; len];
        for offset in rand::seq::index::sample(&mut self.rng, len - n, planted) {
            is_target[n + offset] = true;
        }

        let mut values: Vec<u8> = Vec::with_capacity(len);
        for i in 0..len {
            if is_target[i] {
                values.push(values[i - n]);
                continue;
            }
            let forbidden = (i >= n).then(|| values[i - n]);
            let mut avoid = Vec::with_capacity(2);
            if i > 0 {
                avoid.push(values[i - 1]);
            }
            // the planted copy at i + 1 must not repeat this value
            if n > 1 && i + 1 < len && is_target[i + 1] {
                avoid.push(values[i + 1 - n]);
            }
            let value = self.draw(grid_size, forbidden, &avoid);
            values.push(value);
        }

        let sequence = Sequence::new(values, grid_size)?;
        debug_assert_eq!(sequence.match_count(n), planted);
        debug!(len, n_back, planted, "sequence generated");
        Ok(sequence)
    }

    fn draw(&mut self, grid_size: u8, forbidden: Option<u8>, avoid: &[u8]) -> u8 {
        let allowed = |v: &u8| Some(*v) != forbidden;
        let mut pool: Vec<u8> = (1..=grid_size)
            .filter(allowed)
            .filter(|v| !avoid.contains(v))
            .collect();
        if pool.is_empty() {
            pool = (1..=grid_size).filter(allowed).collect();
        }
        pool[self.rng.random_range(0..pool.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(event_count: u32, grid_size: u8, n_back: u32) -> GameConfiguration {
        GameConfiguration {
            n_back,
            event_count,
            grid_size,
            ..GameConfiguration::default()
        }
    }

    #[test]
    fn length_and_domain_hold() {
        let mut generator = SequenceGenerator::seeded(7);
        for (events, grid, n) in [(10, 9, 2), (2, 2, 1), (40, 9, 5), (25, 3, 3)] {
            let seq = generator.generate(&config(events, grid, n)).unwrap();
            assert_eq!(seq.len(), events as usize);
            assert!(
                seq.values()
                    .iter()
                    .all(|s| (1..=grid).contains(&s.value()))
            );
        }
    }

    #[test]
    fn match_count_follows_policy() {
        let mut generator = SequenceGenerator::seeded(42);
        for seed_round in 0..50u32 {
            let events = 5 + seed_round;
            for n in 1..4 {
                let seq = generator.generate(&config(events, 9, n)).unwrap();
                let expected = expected_matches(events as usize, n as usize, DEFAULT_MATCH_PERCENT);
                assert_eq!(seq.match_count(n as usize), expected, "events={events} n={n}");
            }
        }
    }

    #[test]
    fn tiny_domain_still_exact() {
        let mut generator = SequenceGenerator::seeded(3);
        for _ in 0..20 {
            let seq = generator.generate(&config(30, 2, 2)).unwrap();
            assert_eq!(seq.match_count(2), expected_matches(30, 2, DEFAULT_MATCH_PERCENT));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = SequenceGenerator::seeded(99).generate(&config(20, 9, 2)).unwrap();
        let b = SequenceGenerator::seeded(99).generate(&config(20, 9, 2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn adjacent_repeats_only_where_planted() {
        let mut generator = SequenceGenerator::seeded(11);
        for _ in 0..20 {
            let seq = generator.generate(&config(30, 9, 2)).unwrap();
            let values = seq.values();
            for i in 1..values.len() {
                assert_ne!(values[i], values[i - 1], "index {i} in {values:?}");
            }
        }
    }

    #[test]
    fn expected_matches_policy() {
        assert_eq!(expected_matches(10, 2, 30), 2);
        assert_eq!(expected_matches(3, 2, 30), 1);
        assert_eq!(expected_matches(12, 2, 30), 3);
        assert_eq!(expected_matches(5, 1, 100), 4);
        assert_eq!(expected_matches(2, 2, 30), 0);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mut generator = SequenceGenerator::seeded(0);
        assert!(matches!(
            generator.generate(&config(2, 9, 2)),
            Err(ConfigError::MatchDistanceTooLarge { .. })
        ));
        assert!(matches!(
            generator.generate(&config(10, 9, 0)),
            Err(ConfigError::NonPositive { field: "n_back", .. })
        ));
        assert_eq!(generator.generate(&config(10, 1, 2)), Err(ConfigError::GridTooSmall(1)));
    }

    #[test]
    fn explicit_sequence_checks_domain() {
        assert!(Sequence::new([3, 7, 3, 7, 3], 9).is_ok());
        assert!(Sequence::new([3, 10], 9).is_err());
        assert!(Sequence::new([], 9).is_err());
        let seq = Sequence::new([3, 7, 3, 7, 3], 9).unwrap();
        assert_eq!(seq.match_count(2), 3);
        assert!(!seq.is_match(1, 2));
    }
}
