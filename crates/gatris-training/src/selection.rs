use crate::{chromosome::Chromosome, population::compare_fitness};

/// Natural selection keeping the `size` fittest chromosomes of a pool.
///
/// Sorting is stable, so among equally fit chromosomes the earlier one in the pool
/// survives. Unevaluated chromosomes rank below every evaluated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestSelector {
    pub size: usize,
}

impl BestSelector {
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Returns the survivors, fittest first.
    #[must_use]
    pub fn select(&self, mut pool: Vec<Chromosome>) -> Vec<Chromosome> {
        pool.sort_by(|a, b| compare_fitness(b.fitness(), a.fitness()));
        pool.truncate(self.size);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(tag: f64, fitness: Option<f64>) -> Chromosome {
        let mut chromosome = Chromosome::from_scalars([tag]).unwrap();
        if let Some(fitness) = fitness {
            chromosome.set_fitness(fitness);
        }
        chromosome
    }

    #[test]
    fn test_keeps_fittest_with_stable_ties() {
        let pool = vec![
            tagged(0.0, Some(1.0)),
            tagged(1.0, Some(5.0)),
            tagged(2.0, None),
            tagged(3.0, Some(5.0)),
            tagged(4.0, Some(2.0)),
        ];
        let survivors = BestSelector::new(3).select(pool);
        let tags: Vec<f64> = survivors.iter().flat_map(Chromosome::alleles).collect();
        assert_eq!(tags, [1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_small_pool_survives_whole() {
        let pool = vec![tagged(0.0, None), tagged(1.0, Some(0.0))];
        let survivors = BestSelector::new(10).select(pool);
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].fitness(), Some(0.0));
    }
}
