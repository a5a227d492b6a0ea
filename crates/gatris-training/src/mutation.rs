use std::num::NonZeroUsize;

use rand::RngCore;

use crate::{
    GeneticOperator,
    alleles::{self, AlleleBounds},
    chromosome::Chromosome,
    population::Population,
};

// one allele in two, as the weight tuning runs used
const DEFAULT_RATE_DIVISOR: NonZeroUsize = NonZeroUsize::new(2).unwrap();

/// Bounded Gaussian mutation.
///
/// Every allele of every chromosome is mutated with probability `1 / rate_divisor`.
/// Chromosomes with at least one mutated allele are copied and appended to the
/// candidate pool as fresh offspring; the population is left as it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationOperator {
    pub rate_divisor: NonZeroUsize,
    /// Standard deviation of the noise, as a fraction of the bounds' width.
    pub sigma: f64,
    pub bounds: AlleleBounds,
}

impl Default for MutationOperator {
    fn default() -> Self {
        Self {
            rate_divisor: DEFAULT_RATE_DIVISOR,
            sigma: 0.1,
            bounds: AlleleBounds::default(),
        }
    }
}

impl MutationOperator {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rate(&self) -> f64 {
        1.0 / self.rate_divisor.get() as f64
    }
}

impl GeneticOperator for MutationOperator {
    fn operate(
        &self,
        population: &Population,
        candidates: &mut Vec<Chromosome>,
        rng: &mut dyn RngCore,
    ) {
        let rate = self.rate();
        for chromosome in population.chromosomes() {
            let mut copy = chromosome.clone();
            let mut mutated = false;
            for gene in copy.genes_mut() {
                mutated |= alleles::mutate(gene.values_mut(), self.sigma, self.bounds, rate, rng);
            }
            if mutated {
                candidates.push(copy.into_offspring());
            }
        }
    }
}
