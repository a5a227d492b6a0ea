//! Fitness-biased single-allele crossover.
//!
//! # Sampling
//!
//! The operator looks at the population through a view sorted by ascending fitness and
//! draws mates from it with a triangular distribution: with `n` chromosomes in the view,
//! position `k` is drawn with probability
//!
//! ```text
//! P(k) = (k + 1) / (n (n + 1) / 2)
//! ```
//!
//! so the fittest chromosome (position `n - 1`) is picked `n` times as often as the
//! least fit one. A position is drawn by picking `j` uniformly in `[0, n (n + 1) / 2)`
//! and inverting the triangular-number sum, see [`triangular_index`].
//!
//! # Recombination
//!
//! Each pair exchanges exactly one scalar allele ([`recombine`]). The operator works on
//! copies: every chromosome touched by at least one recombined pair is appended to the
//! candidate pool once, in its final state, as fresh offspring. The population itself
//! is never modified.
//!
//! [`SamplingMode::Uniform`] is the simpler variant kept for comparison runs: mates are
//! drawn uniformly and each recombined pair appends both children.

use std::{collections::BTreeSet, fmt, num::NonZeroUsize};

use rand::{Rng, RngCore};

use crate::{GeneticOperator, chromosome::Chromosome, gene::Gene, population::Population};

/// How many pairs one application of the operator samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossoverRate {
    /// `size / divisor * gene_count` pairs (integer division).
    Divisor(NonZeroUsize),
    /// `floor(size * percent)` pairs.
    Percent(f64),
}

impl Default for CrossoverRate {
    fn default() -> Self {
        Self::Divisor(NonZeroUsize::MIN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Fitness-biased triangular sampling with deduplicated output.
    #[default]
    Triangular,
    /// Uniform sampling, both children of every pair appended.
    Uniform,
}

/// Veto over a sampled pair of mates.
pub trait PairConstraint: fmt::Debug + Send + Sync {
    fn allows(&self, population: &Population, first: &Chromosome, second: &Chromosome) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverConfig {
    /// Upper bound on the number of chromosomes the operator samples from.
    pub population_size: usize,
    pub rate: CrossoverRate,
    pub sampling: SamplingMode,
    /// Whether two chromosomes that have not yet survived a generation may mate.
    pub allow_new_age_crossover: bool,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            rate: CrossoverRate::default(),
            sampling: SamplingMode::default(),
            allow_new_age_crossover: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct BiasedCrossoverOperator {
    config: CrossoverConfig,
    constraint: Option<Box<dyn PairConstraint>>,
}

impl BiasedCrossoverOperator {
    #[must_use]
    pub fn new(config: CrossoverConfig) -> Self {
        Self {
            config,
            constraint: None,
        }
    }

    #[must_use]
    pub fn with_constraint<C>(mut self, constraint: C) -> Self
    where
        C: PairConstraint + 'static,
    {
        self.constraint = Some(Box::new(constraint));
        self
    }

    #[must_use]
    pub fn config(&self) -> &CrossoverConfig {
        &self.config
    }

    /// Number of pairs sampled from a population of `len` chromosomes with `gene_count`
    /// genes each.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn crossover_count(&self, len: usize, gene_count: usize) -> usize {
        let size = self.config.population_size.min(len);
        match self.config.rate {
            CrossoverRate::Divisor(divisor) => size / divisor.get() * gene_count,
            CrossoverRate::Percent(percent) => (size as f64 * percent).floor().max(0.0) as usize,
        }
    }

    fn accepts(&self, population: &Population, first: &Chromosome, second: &Chromosome) -> bool {
        if !self.config.allow_new_age_crossover && first.age() < 1 && second.age() < 1 {
            return false;
        }
        self.constraint
            .as_ref()
            .is_none_or(|constraint| constraint.allows(population, first, second))
    }

    fn operate_triangular(
        &self,
        population: &Population,
        view: &[usize],
        pairs: usize,
        candidates: &mut Vec<Chromosome>,
        rng: &mut dyn RngCore,
    ) {
        let mut working: Vec<Chromosome> = view
            .iter()
            .map(|&i| population.chromosomes()[i].clone())
            .collect();
        let mut touched = BTreeSet::new();

        for _ in 0..pairs {
            let i = sample_triangular(working.len(), rng);
            let j = sample_triangular(working.len(), rng);
            if i == j || !self.accepts(population, &working[i], &working[j]) {
                continue;
            }
            let (a, b) = recombine(&working[i], &working[j], rng);
            working[i] = a;
            working[j] = b;
            touched.extend([i, j]);
        }

        candidates.extend(
            touched
                .into_iter()
                .map(|i| working[i].clone().into_offspring()),
        );
    }

    fn operate_uniform(
        &self,
        population: &Population,
        view: &[usize],
        pairs: usize,
        candidates: &mut Vec<Chromosome>,
        rng: &mut dyn RngCore,
    ) {
        for _ in 0..pairs {
            let i = view[rng.random_range(0..view.len())];
            let j = view[rng.random_range(0..view.len())];
            let (first, second) = (&population.chromosomes()[i], &population.chromosomes()[j]);
            if i == j || !self.accepts(population, first, second) {
                continue;
            }
            let (a, b) = recombine(first, second, rng);
            candidates.push(a.into_offspring());
            candidates.push(b.into_offspring());
        }
    }
}

impl GeneticOperator for BiasedCrossoverOperator {
    fn operate(
        &self,
        population: &Population,
        candidates: &mut Vec<Chromosome>,
        rng: &mut dyn RngCore,
    ) {
        let pairs = self.crossover_count(population.len(), population.gene_count());
        if pairs == 0 {
            return;
        }
        let size = self.config.population_size.min(population.len());
        let sorted = population.indices_by_fitness();
        // the fittest `size` chromosomes, least fit first
        let view = &sorted[sorted.len() - size..];

        match self.config.sampling {
            SamplingMode::Triangular => {
                self.operate_triangular(population, view, pairs, candidates, rng);
            }
            SamplingMode::Uniform => {
                self.operate_uniform(population, view, pairs, candidates, rng);
            }
        }
    }
}

/// Exchanges one scalar allele between copies of two mates.
///
/// A locus is chosen uniformly; for a composite gene one sub-position is chosen
/// uniformly and used for both mates. The copies keep their age and lose their fitness.
///
/// # Panics
///
/// Panics if the mates differ in shape.
pub fn recombine<R>(
    first: &Chromosome,
    second: &Chromosome,
    rng: &mut R,
) -> (Chromosome, Chromosome)
where
    R: Rng + ?Sized,
{
    assert!(
        first.same_shape(second),
        "mates must have the same gene layout"
    );
    let mut a = first.clone();
    let mut b = second.clone();

    let locus = rng.random_range(0..a.genes().len());
    let index = match &a.genes()[locus] {
        Gene::Composite(values) => rng.random_range(0..values.len()),
        Gene::Scalar(_) => 0,
    };
    let x = &mut a.genes_mut()[locus].values_mut()[index];
    let y = &mut b.genes_mut()[locus].values_mut()[index];
    std::mem::swap(x, y);
    (a, b)
}

/// Draws a position in `0..size` with probability proportional to `position + 1`.
///
/// # Panics
///
/// Panics if `size` is 0.
pub fn sample_triangular<R>(size: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    assert!(size > 0, "cannot sample from an empty population");
    let size = size as u64;
    let j = rng.random_range(0..size * (size + 1) / 2);
    triangular_index(j)
}

/// The `k` with `k (k + 1) / 2 <= j < (k + 1) (k + 2) / 2`.
///
/// Computed as `floor((sqrt(1 + 8 j) - 1) / 2)` and corrected with integer arithmetic,
/// so the result is exact even where the floating-point root rounds the wrong way.
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
#[must_use]
pub fn triangular_index(j: u64) -> usize {
    let tri = |k: u64| k * (k + 1) / 2;
    let mut k = ((((8 * j + 1) as f64).sqrt() - 1.0) / 2.0).floor() as u64;
    while tri(k + 1) <= j {
        k += 1;
    }
    while tri(k) > j {
        k -= 1;
    }
    k as usize
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss)]
mod tests {
    use gatris_stats::chi_square::ChiSquare;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn scalar_chromosome(values: &[f64], fitness: f64, age: u32) -> Chromosome {
        let mut chromosome = Chromosome::from_scalars(values.iter().copied()).unwrap();
        chromosome.set_fitness(fitness);
        for _ in 0..age {
            chromosome.increment_age();
        }
        chromosome
    }

    fn ranked_population(size: usize, age: u32) -> Population {
        // fitness descending with index, so the view reverses the population order
        let chromosomes = (0..size)
            .map(|i| {
                let base = i as f64 * 10.0;
                scalar_chromosome(&[base, base + 1.0, base + 2.0], -(i as f64), age)
            })
            .collect();
        Population::new(chromosomes).unwrap()
    }

    #[test]
    fn test_triangular_index_inverts_the_sum() {
        let expected = [0, 1, 1, 2, 2, 2, 3, 3, 3, 3, 4];
        for (j, &k) in expected.iter().enumerate() {
            assert_eq!(triangular_index(j as u64), k, "j = {j}");
        }
        // boundaries far from zero
        let k = 1_000_000u64;
        let start = k * (k + 1) / 2;
        assert_eq!(triangular_index(start - 1), 999_999);
        assert_eq!(triangular_index(start), 1_000_000);
        assert_eq!(triangular_index(start + k), 1_000_000);
        assert_eq!(triangular_index(start + k + 1), 1_000_001);
    }

    #[test]
    fn test_triangular_sampling_matches_analytic_distribution() {
        const SIZE: usize = 10;
        const DRAWS: usize = 200_000;
        let mut rng = Pcg32::seed_from_u64(0x5eed);
        let mut counts = [0u64; SIZE];
        for _ in 0..DRAWS {
            counts[sample_triangular(SIZE, &mut rng)] += 1;
        }

        let total = (SIZE * (SIZE + 1) / 2) as f64;
        let triangular: Vec<f64> = (0..SIZE).map(|k| (k + 1) as f64 / total).collect();
        let chi = ChiSquare::goodness_of_fit(&counts, &triangular).unwrap();
        assert_eq!(chi.degrees_of_freedom, 9);
        // critical value for 9 degrees of freedom at p = 0.001
        assert!(chi.statistic < 27.88, "statistic = {}", chi.statistic);

        let uniform = ChiSquare::goodness_of_fit(&counts, &[0.1; SIZE]).unwrap();
        assert!(uniform.statistic > 1000.0, "statistic = {}", uniform.statistic);
    }

    #[test]
    fn test_recombine_swaps_exactly_one_allele() {
        let mut rng = Pcg32::seed_from_u64(7);
        let a = scalar_chromosome(&[1.0, 2.0, 3.0], 5.0, 2);
        let b = scalar_chromosome(&[-1.0, -2.0, -3.0], 6.0, 0);
        for _ in 0..50 {
            let (x, y) = recombine(&a, &b, &mut rng);
            let changed: Vec<usize> = (0..3)
                .filter(|&i| x.genes()[i] != a.genes()[i])
                .collect();
            assert_eq!(changed.len(), 1);
            let locus = changed[0];
            assert_eq!(x.genes()[locus], b.genes()[locus]);
            assert_eq!(y.genes()[locus], a.genes()[locus]);
            assert_eq!(x.fitness(), None);
            assert_eq!(x.age(), 2);
        }
        assert_eq!(a.alleles().collect::<Vec<_>>(), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_recombine_composite_uses_one_sub_position() {
        let mut rng = Pcg32::seed_from_u64(8);
        let a = Chromosome::new(vec![Gene::Composite(vec![1.0, 2.0, 3.0])]).unwrap();
        let b = Chromosome::new(vec![Gene::Composite(vec![4.0, 5.0, 6.0])]).unwrap();
        for _ in 0..50 {
            let (x, y) = recombine(&a, &b, &mut rng);
            let xs: Vec<f64> = x.alleles().collect();
            let ys: Vec<f64> = y.alleles().collect();
            let swapped: Vec<usize> = (0..3)
                .filter(|&i| xs[i] != a.genes()[0].values()[i])
                .collect();
            assert_eq!(swapped.len(), 1);
            let i = swapped[0];
            assert_eq!(xs[i], b.genes()[0].values()[i]);
            assert_eq!(ys[i], a.genes()[0].values()[i]);
        }
    }

    #[test]
    #[should_panic(expected = "same gene layout")]
    fn test_recombine_rejects_mismatched_mates() {
        let a = Chromosome::from_scalars([1.0, 2.0]).unwrap();
        let b = Chromosome::from_scalars([1.0]).unwrap();
        let _ = recombine(&a, &b, &mut Pcg32::seed_from_u64(0));
    }

    #[test]
    fn test_crossover_count() {
        let operator = BiasedCrossoverOperator::new(CrossoverConfig {
            population_size: 100,
            rate: CrossoverRate::Divisor(NonZeroUsize::new(3).unwrap()),
            ..CrossoverConfig::default()
        });
        assert_eq!(operator.crossover_count(50, 9), 50 / 3 * 9);
        assert_eq!(operator.crossover_count(500, 9), 100 / 3 * 9);

        let operator = BiasedCrossoverOperator::new(CrossoverConfig {
            population_size: 100,
            rate: CrossoverRate::Percent(0.25),
            ..CrossoverConfig::default()
        });
        assert_eq!(operator.crossover_count(50, 9), 12);
    }

    #[test]
    fn test_population_is_never_mutated() {
        let population = ranked_population(20, 1);
        let snapshot = population.clone();
        let operator = BiasedCrossoverOperator::default();
        let mut candidates = vec![];
        let mut rng = Pcg32::seed_from_u64(99);
        operator.operate(&population, &mut candidates, &mut rng);

        assert_eq!(population, snapshot);
        assert!(!candidates.is_empty());
        for offspring in &candidates {
            assert_eq!(offspring.fitness(), None);
            assert_eq!(offspring.age(), 0);
        }
    }

    #[test]
    fn test_touched_chromosomes_are_appended_once() {
        let population = ranked_population(6, 1);
        let operator = BiasedCrossoverOperator::default();
        let mut candidates = vec![];
        let mut rng = Pcg32::seed_from_u64(5);
        operator.operate(&population, &mut candidates, &mut rng);

        // swaps only permute the values of one locus among chromosomes, so two copies
        // of the same working chromosome would be the only way to get equal offspring
        assert!(!candidates.is_empty());
        assert!(candidates.len() <= population.len());
        let mut seen = BTreeSet::new();
        for offspring in &candidates {
            let alleles: Vec<f64> = offspring.alleles().collect();
            for (locus, value) in alleles.iter().enumerate() {
                let offset = locus as f64;
                assert_eq!((value - offset) % 10.0, 0.0, "allele moved to another locus");
            }
            seen.insert(alleles.iter().map(|v| v.to_bits()).collect::<Vec<_>>());
        }
        assert_eq!(seen.len(), candidates.len());
    }

    #[test]
    fn test_new_chromosomes_do_not_mate_when_disallowed() {
        let population = ranked_population(10, 0);
        let operator = BiasedCrossoverOperator::new(CrossoverConfig {
            allow_new_age_crossover: false,
            ..CrossoverConfig::default()
        });
        let mut candidates = vec![];
        operator.operate(&population, &mut candidates, &mut Pcg32::seed_from_u64(1));
        assert!(candidates.is_empty());

        let aged = ranked_population(10, 1);
        operator.operate(&aged, &mut candidates, &mut Pcg32::seed_from_u64(1));
        assert!(!candidates.is_empty());
    }

    #[derive(Debug)]
    struct RejectAll;

    impl PairConstraint for RejectAll {
        fn allows(&self, _: &Population, _: &Chromosome, _: &Chromosome) -> bool {
            false
        }
    }

    #[test]
    fn test_constraint_can_veto_every_pair() {
        let population = ranked_population(10, 1);
        let operator = BiasedCrossoverOperator::default().with_constraint(RejectAll);
        let mut candidates = vec![];
        operator.operate(&population, &mut candidates, &mut Pcg32::seed_from_u64(1));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_single_chromosome_never_mates_with_itself() {
        let population = ranked_population(1, 1);
        let operator = BiasedCrossoverOperator::default();
        let mut candidates = vec![];
        operator.operate(&population, &mut candidates, &mut Pcg32::seed_from_u64(1));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_uniform_mode_appends_both_children_per_pair() {
        let population = ranked_population(8, 1);
        let operator = BiasedCrossoverOperator::new(CrossoverConfig {
            sampling: SamplingMode::Uniform,
            rate: CrossoverRate::Percent(0.5),
            ..CrossoverConfig::default()
        });
        let mut candidates = vec![];
        operator.operate(&population, &mut candidates, &mut Pcg32::seed_from_u64(3));
        // 4 pairs sampled; same-index pairs append nothing
        assert!(candidates.len() <= 8);
        assert_eq!(candidates.len() % 2, 0);
    }

    #[test]
    fn test_view_is_limited_to_the_fittest() {
        // population_size 2 restricts mating to the two fittest chromosomes
        let population = ranked_population(10, 1);
        let operator = BiasedCrossoverOperator::new(CrossoverConfig {
            population_size: 2,
            ..CrossoverConfig::default()
        });
        let mut candidates = vec![];
        operator.operate(&population, &mut candidates, &mut Pcg32::seed_from_u64(4));
        assert!(candidates.len() <= 2);
        for offspring in &candidates {
            assert!(offspring.alleles().all(|v| v < 20.0));
        }
    }
}
