//! Genetic algorithm for tuning heuristic weight vectors.
//!
//! # Architecture
//!
//! ```text
//! Genotype (one generation per evolve call)
//!     ↓ applies
//! GeneticOperator (BiasedCrossoverOperator, MutationOperator) → candidate pool
//!     ↓ evaluated by
//! FitnessFunction (WeightFitness → gatris-evaluator games)
//!     ↓ ranked by
//! BestSelector → next population
//! ```
//!
//! Operators never modify the population they read: they append new chromosomes to a
//! candidate pool, and selection picks the next population from population ∪ pool.
//!
//! # Example
//!
//! ```
//! use gatris_evaluator::fitness::{FitnessConfig, FitnessEvaluator, RandomGames};
//! use gatris_training::{
//!     alleles::AlleleBounds,
//!     crossover::BiasedCrossoverOperator,
//!     fitness::WeightFitness,
//!     genotype::{Genotype, GenotypeConfig},
//!     mutation::MutationOperator,
//!     population::Population,
//! };
//!
//! let mut rng = rand::rng();
//! let population = Population::random(6, 9, AlleleBounds::default(), &mut rng);
//! let config = FitnessConfig { games: 1, piece_limit: 20, ..FitnessConfig::default() };
//! let fitness = WeightFitness::new(FitnessEvaluator::new(config, RandomGames::new()));
//!
//! let mut genotype = Genotype::new(population, GenotypeConfig { population_size: 6 }, fitness);
//! genotype.add_operator(MutationOperator::default());
//! genotype.add_operator(BiasedCrossoverOperator::default());
//! genotype.evolve(&mut rng).unwrap();
//! assert_eq!(genotype.population().len(), 6);
//! ```

use std::fmt;

use rand::RngCore;

use crate::{chromosome::Chromosome, population::Population};

pub mod alleles;
pub mod chromosome;
pub mod crossover;
pub mod fitness;
pub mod gene;
pub mod genotype;
pub mod mutation;
pub mod population;
pub mod selection;

/// Chromosomes that cannot take part in allele exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ChromosomeShapeError {
    #[display("chromosome has no genes")]
    NoGenes,
    #[display("composite gene at locus {locus} is empty")]
    EmptyComposite { locus: usize },
    #[display("chromosome {index} differs in gene layout from chromosome 0")]
    Mismatch { index: usize },
}

/// Produces candidate chromosomes from a population.
pub trait GeneticOperator: fmt::Debug + Send + Sync {
    /// Appends new chromosomes to `candidates`. Must not change `population`.
    fn operate(
        &self,
        population: &Population,
        candidates: &mut Vec<Chromosome>,
        rng: &mut dyn RngCore,
    );
}
