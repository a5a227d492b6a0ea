use gatris_evaluator::heuristic::{WeightCountError, WeightVector};

use crate::{ChromosomeShapeError, gene::Gene};

/// A candidate solution: ordered genes plus bookkeeping used by the operators.
///
/// `age` counts the generations a chromosome has survived selection; freshly created
/// chromosomes start at 0. `fitness` is `None` until the chromosome is evaluated, and is
/// cleared whenever an allele changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    genes: Vec<Gene>,
    age: u32,
    fitness: Option<f64>,
}

impl Chromosome {
    pub fn new(genes: Vec<Gene>) -> Result<Self, ChromosomeShapeError> {
        if genes.is_empty() {
            return Err(ChromosomeShapeError::NoGenes);
        }
        if let Some(locus) = genes.iter().position(Gene::is_empty) {
            return Err(ChromosomeShapeError::EmptyComposite { locus });
        }
        Ok(Self {
            genes,
            age: 0,
            fitness: None,
        })
    }

    /// A chromosome of scalar genes, one per value.
    pub fn from_scalars<I>(values: I) -> Result<Self, ChromosomeShapeError>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::new(values.into_iter().map(Gene::Scalar).collect())
    }

    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Mutable access to the genes. Clears the fitness.
    pub fn genes_mut(&mut self) -> &mut [Gene] {
        self.fitness = None;
        &mut self.genes
    }

    /// All scalar alleles, genes flattened in order.
    pub fn alleles(&self) -> impl Iterator<Item = f64> + '_ {
        self.genes.iter().flat_map(|gene| gene.values().iter().copied())
    }

    /// Interprets the alleles as heuristic weights.
    pub fn to_weights(&self) -> Result<WeightVector, WeightCountError> {
        let alleles: Vec<f64> = self.alleles().collect();
        WeightVector::try_from(alleles.as_slice())
    }

    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn increment_age(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    #[must_use]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Turns a copy into fresh offspring: age 0, not yet evaluated.
    #[must_use]
    pub fn into_offspring(mut self) -> Self {
        self.age = 0;
        self.fitness = None;
        self
    }

    /// Whether `other` has genes of the same kinds and lengths at every locus.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.genes.len() == other.genes.len()
            && self.genes.iter().zip(&other.genes).all(|(a, b)| a.same_shape(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_validation() {
        assert_eq!(Chromosome::new(vec![]), Err(ChromosomeShapeError::NoGenes));
        assert_eq!(
            Chromosome::new(vec![Gene::Scalar(1.0), Gene::Composite(vec![])]),
            Err(ChromosomeShapeError::EmptyComposite { locus: 1 })
        );
    }

    #[test]
    fn test_alleles_flatten_composites() {
        let chromosome = Chromosome::new(vec![
            Gene::Scalar(1.0),
            Gene::Composite(vec![2.0, 3.0]),
            Gene::Scalar(4.0),
        ])
        .unwrap();
        assert_eq!(chromosome.alleles().collect::<Vec<_>>(), [1.0, 2.0, 3.0, 4.0]);
        assert!(chromosome.to_weights().is_err());
    }

    #[test]
    fn test_nine_scalars_make_weights() {
        let chromosome = Chromosome::from_scalars((0..9).map(f64::from)).unwrap();
        let weights = chromosome.to_weights().unwrap();
        assert_eq!(weights.as_array()[8], 8.0);
    }

    #[test]
    fn test_editing_genes_clears_fitness() {
        let mut chromosome = Chromosome::from_scalars([0.5]).unwrap();
        chromosome.set_fitness(3.0);
        chromosome.increment_age();
        chromosome.genes_mut()[0] = Gene::Scalar(0.25);
        assert_eq!(chromosome.fitness(), None);
        assert_eq!(chromosome.age(), 1);
        assert_eq!(chromosome.into_offspring().age(), 0);
    }
}
