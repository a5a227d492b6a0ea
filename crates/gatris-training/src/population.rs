use std::cmp::Ordering;

use gatris_stats::descriptive::DescriptiveStats;
use rand::Rng;

use crate::{
    ChromosomeShapeError,
    alleles::{self, AlleleBounds},
    chromosome::Chromosome,
};

/// The chromosomes of one generation.
///
/// All chromosomes share one shape (gene kinds and lengths per locus), which is what
/// lets the operators exchange alleles between any two of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    chromosomes: Vec<Chromosome>,
}

impl Population {
    pub fn new(chromosomes: Vec<Chromosome>) -> Result<Self, ChromosomeShapeError> {
        if let Some(first) = chromosomes.first()
            && let Some(index) = chromosomes.iter().position(|c| !c.same_shape(first))
        {
            return Err(ChromosomeShapeError::Mismatch { index });
        }
        Ok(Self { chromosomes })
    }

    /// Wraps chromosomes already known to share one shape, such as selection survivors.
    pub(crate) fn from_uniform(chromosomes: Vec<Chromosome>) -> Self {
        debug_assert!(
            chromosomes
                .first()
                .is_none_or(|first| chromosomes.iter().all(|c| c.same_shape(first)))
        );
        Self { chromosomes }
    }

    /// `size` chromosomes of `gene_count` scalar genes drawn uniformly from `bounds`.
    ///
    /// # Panics
    ///
    /// Panics if `gene_count` is 0.
    pub fn random<R>(size: usize, gene_count: usize, bounds: AlleleBounds, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(gene_count > 0, "chromosomes need at least one gene");
        let chromosomes = (0..size)
            .map(|_| {
                Chromosome::from_scalars(alleles::random(rng, bounds, gene_count))
                    .expect("gene_count is non-zero")
            })
            .collect();
        Self { chromosomes }
    }

    #[must_use]
    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    /// Fitness values may be set through this; gene layouts must stay unchanged.
    pub(crate) fn chromosomes_mut(&mut self) -> &mut [Chromosome] {
        &mut self.chromosomes
    }

    #[must_use]
    pub fn into_chromosomes(self) -> Vec<Chromosome> {
        self.chromosomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Genes per chromosome, or 0 for an empty population.
    #[must_use]
    pub fn gene_count(&self) -> usize {
        self.chromosomes.first().map_or(0, |c| c.genes().len())
    }

    /// The evaluated chromosome with the highest fitness. The first one wins ties.
    #[must_use]
    pub fn fittest(&self) -> Option<&Chromosome> {
        self.chromosomes
            .iter()
            .filter(|c| c.fitness().is_some())
            .reduce(|best, c| if c.fitness() > best.fitness() { c } else { best })
    }

    /// Indices of the chromosomes ordered by ascending fitness.
    ///
    /// Unevaluated chromosomes sort first; equal fitness keeps population order.
    #[must_use]
    pub fn indices_by_fitness(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.chromosomes.len()).collect();
        indices.sort_by(|&a, &b| {
            compare_fitness(self.chromosomes[a].fitness(), self.chromosomes[b].fitness())
        });
        indices
    }

    /// Fitness distribution of the evaluated chromosomes.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.chromosomes.iter().filter_map(Chromosome::fitness))
    }

    /// Distribution of every scalar allele position across the population.
    #[must_use]
    pub fn allele_stats(&self) -> Vec<DescriptiveStats> {
        let Some(first) = self.chromosomes.first() else {
            return vec![];
        };
        (0..first.alleles().count())
            .filter_map(|i| {
                DescriptiveStats::new(self.chromosomes.iter().filter_map(|c| c.alleles().nth(i)))
            })
            .collect()
    }
}

pub(crate) fn compare_fitness(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::gene::Gene;

    fn evaluated(values: &[f64], fitness: Option<f64>) -> Chromosome {
        let mut chromosome = Chromosome::from_scalars(values.iter().copied()).unwrap();
        if let Some(fitness) = fitness {
            chromosome.set_fitness(fitness);
        }
        chromosome
    }

    #[test]
    fn test_random_population() {
        let mut rng = Pcg32::seed_from_u64(11);
        let population = Population::random(50, 9, AlleleBounds::default(), &mut rng);
        assert_eq!(population.len(), 50);
        assert_eq!(population.gene_count(), 9);
        for chromosome in population.chromosomes() {
            assert_eq!(chromosome.age(), 0);
            assert_eq!(chromosome.fitness(), None);
            assert!(chromosome.alleles().all(|v| (-1.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn test_mixed_shapes_are_rejected() {
        let scalar = evaluated(&[1.0, 2.0], None);
        let composite = Chromosome::new(vec![Gene::Scalar(1.0), Gene::Composite(vec![2.0])]).unwrap();
        assert_eq!(
            Population::new(vec![scalar.clone(), composite]),
            Err(ChromosomeShapeError::Mismatch { index: 1 })
        );
        assert!(Population::new(vec![scalar.clone(), scalar]).is_ok());
        assert!(Population::new(vec![]).is_ok());
    }

    #[test]
    fn test_fitness_ordering() {
        let population = Population::new(vec![
            evaluated(&[0.0], Some(3.0)),
            evaluated(&[1.0], None),
            evaluated(&[2.0], Some(-1.0)),
            evaluated(&[3.0], Some(3.0)),
        ])
        .unwrap();
        assert_eq!(population.indices_by_fitness(), [1, 2, 0, 3]);
        let fittest = population.fittest().unwrap();
        assert_eq!(fittest.alleles().next(), Some(0.0));
    }

    #[test]
    fn test_stats() {
        let population = Population::new(vec![
            evaluated(&[0.0, 1.0], Some(2.0)),
            evaluated(&[1.0, 3.0], Some(4.0)),
            evaluated(&[2.0, 5.0], None),
        ])
        .unwrap();
        let fitness = population.fitness_stats().unwrap();
        assert_eq!(fitness.mean, 3.0);
        let alleles = population.allele_stats();
        assert_eq!(alleles.len(), 2);
        assert_eq!(alleles[0].mean, 1.0);
        assert_eq!(alleles[1].max, 5.0);
    }
}
