use std::{convert::Infallible, error::Error};

use gatris_evaluator::{
    fitness::{FitnessEvaluator, GameFactory},
    heuristic::WeightCountError,
};

use crate::chromosome::Chromosome;

/// Objective maximised by the genetic algorithm.
///
/// Called concurrently from several threads, once per unevaluated chromosome.
pub trait FitnessFunction: Sync {
    type Error: Error + Send;

    fn fitness(&self, chromosome: &Chromosome) -> Result<f64, Self::Error>;
}

/// Scores a chromosome by playing games with its alleles as heuristic weights.
#[derive(Debug, Clone)]
pub struct WeightFitness<G> {
    evaluator: FitnessEvaluator<G>,
}

impl<G> WeightFitness<G> {
    pub fn new(evaluator: FitnessEvaluator<G>) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &FitnessEvaluator<G> {
        &self.evaluator
    }
}

impl<'a, G> FitnessFunction for WeightFitness<G>
where
    G: GameFactory<'a> + Sync,
{
    type Error = WeightCountError;

    fn fitness(&self, chromosome: &Chromosome) -> Result<f64, Self::Error> {
        Ok(self.evaluator.evaluate(&chromosome.to_weights()?))
    }
}

/// Wraps a plain function of the alleles, mainly for tests and experiments.
#[derive(Debug, Clone, Copy)]
pub struct AlleleFitness<F>(pub F);

impl<F> FitnessFunction for AlleleFitness<F>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    type Error = Infallible;

    fn fitness(&self, chromosome: &Chromosome) -> Result<f64, Self::Error> {
        let alleles: Vec<f64> = chromosome.alleles().collect();
        Ok((self.0)(&alleles))
    }
}
