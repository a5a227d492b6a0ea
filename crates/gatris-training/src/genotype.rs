use std::{num::NonZeroUsize, panic, thread};

use rand::RngCore;

use crate::{
    GeneticOperator, chromosome::Chromosome, fitness::FitnessFunction, population::Population,
    selection::BestSelector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenotypeConfig {
    /// Number of chromosomes kept by natural selection each generation.
    pub population_size: usize,
}

impl Default for GenotypeConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
        }
    }
}

/// A population together with the operators and objective that evolve it.
#[derive(Debug)]
pub struct Genotype<F> {
    population: Population,
    operators: Vec<Box<dyn GeneticOperator>>,
    selector: BestSelector,
    fitness: F,
    generation: usize,
}

impl<F> Genotype<F>
where
    F: FitnessFunction,
{
    pub fn new(population: Population, config: GenotypeConfig, fitness: F) -> Self {
        Self {
            population,
            operators: vec![],
            selector: BestSelector::new(config.population_size),
            fitness,
            generation: 0,
        }
    }

    /// Adds an operator. Operators run in the order they were added.
    pub fn add_operator<O>(&mut self, operator: O)
    where
        O: GeneticOperator + 'static,
    {
        self.operators.push(Box::new(operator));
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Number of completed [`Self::evolve`] calls.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn fittest(&self) -> Option<&Chromosome> {
        self.population.fittest()
    }

    /// Evaluates every chromosome of the current population that has no fitness yet.
    pub fn evaluate(&mut self) -> Result<(), F::Error> {
        evaluate_all(self.population.chromosomes_mut(), &self.fitness)
    }

    /// Runs one generation.
    ///
    /// 1. every operator appends candidates derived from the current population
    /// 2. unevaluated chromosomes of population ∪ candidates are evaluated in parallel
    /// 3. the fittest survive and age by one generation
    pub fn evolve<R>(&mut self, rng: &mut R) -> Result<(), F::Error>
    where
        R: RngCore,
    {
        let mut candidates = vec![];
        for operator in &self.operators {
            operator.operate(&self.population, &mut candidates, &mut *rng);
        }
        let candidate_count = candidates.len();

        let mut pool = self.population.chromosomes().to_vec();
        pool.append(&mut candidates);
        evaluate_all(&mut pool, &self.fitness)?;

        let mut survivors = self.selector.select(pool);
        for chromosome in &mut survivors {
            chromosome.increment_age();
        }
        self.population = Population::from_uniform(survivors);
        self.generation += 1;

        log::debug!(
            "generation {}: {candidate_count} candidates, best fitness {:?}",
            self.generation,
            self.fittest().and_then(Chromosome::fitness)
        );
        Ok(())
    }
}

/// Evaluates every chromosome without a fitness, spreading the work over the
/// available cores.
///
/// Each chromosome is evaluated independently; the first error is returned after all
/// threads finish.
pub fn evaluate_all<F>(chromosomes: &mut [Chromosome], fitness: &F) -> Result<(), F::Error>
where
    F: FitnessFunction + ?Sized,
{
    let mut pending: Vec<&mut Chromosome> = chromosomes
        .iter_mut()
        .filter(|c| c.fitness().is_none())
        .collect();
    if pending.is_empty() {
        return Ok(());
    }
    let threads = thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .min(pending.len());
    let chunk_size = pending.len().div_ceil(threads);

    thread::scope(|s| {
        let handles: Vec<_> = pending
            .chunks_mut(chunk_size)
            .map(|chunk| {
                s.spawn(move || {
                    for chromosome in chunk {
                        let value = fitness.fitness(chromosome)?;
                        chromosome.set_fitness(value);
                    }
                    Ok::<_, F::Error>(())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        alleles::AlleleBounds, crossover::BiasedCrossoverOperator, fitness::AlleleFitness,
        mutation::MutationOperator,
    };

    fn sum_fitness() -> AlleleFitness<fn(&[f64]) -> f64> {
        AlleleFitness(|alleles: &[f64]| alleles.iter().sum())
    }

    #[test]
    fn test_evaluate_all_fills_missing_fitness_only() {
        let mut chromosomes: Vec<_> = (0..37)
            .map(|i| Chromosome::from_scalars([f64::from(i), 1.0]).unwrap())
            .collect();
        chromosomes[3].set_fitness(-5.0);
        evaluate_all(&mut chromosomes, &sum_fitness()).unwrap();
        assert_eq!(chromosomes[3].fitness(), Some(-5.0));
        assert_eq!(chromosomes[10].fitness(), Some(11.0));
        assert!(chromosomes.iter().all(|c| c.fitness().is_some()));
    }

    #[test]
    fn test_evolution_never_loses_the_best() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let population = Population::random(30, 9, AlleleBounds::default(), &mut rng);
        let mut genotype = Genotype::new(
            population,
            GenotypeConfig { population_size: 30 },
            sum_fitness(),
        );
        genotype.add_operator(MutationOperator::default());
        genotype.add_operator(BiasedCrossoverOperator::default());
        genotype.evaluate().unwrap();

        let mut best = genotype.fittest().and_then(Chromosome::fitness).unwrap();
        for _ in 0..10 {
            genotype.evolve(&mut rng).unwrap();
            let current = genotype.fittest().and_then(Chromosome::fitness).unwrap();
            assert!(current >= best);
            best = current;
            assert_eq!(genotype.population().len(), 30);
        }
        assert_eq!(genotype.generation(), 10);
        assert!(genotype.population().chromosomes().iter().all(|c| c.age() >= 1));
        // nine alleles in [-1, 1]: selection pushes the sum well above its mean of 0
        assert!(best > 2.0, "best = {best}");
    }

    #[test]
    fn test_survivors_age() {
        let mut rng = Pcg32::seed_from_u64(1);
        let population = Population::random(5, 9, AlleleBounds::default(), &mut rng);
        let config = GenotypeConfig { population_size: 5 };
        let mut genotype = Genotype::new(population, config, sum_fitness());
        genotype.evolve(&mut rng).unwrap();
        genotype.evolve(&mut rng).unwrap();
        // without operators the population just ages
        assert!(genotype.population().chromosomes().iter().all(|c| c.age() == 2));
    }
}
