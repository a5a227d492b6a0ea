use std::path::PathBuf;

use chrono::Utc;
use gatris_evaluator::{fitness::FitnessEvaluator, heuristic::WEIGHT_COUNT};
use gatris_stats::descriptive::DescriptiveStats;
use gatris_training::{
    alleles::AlleleBounds,
    crossover::{BiasedCrossoverOperator, CrossoverConfig, CrossoverRate, SamplingMode},
    fitness::WeightFitness,
    genotype::{Genotype, GenotypeConfig},
    mutation::MutationOperator,
    population::Population,
};

use super::GameArg;
use crate::{model::WeightModel, util::Output};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Sampling {
    #[default]
    Triangular,
    Uniform,
}

impl From<Sampling> for SamplingMode {
    fn from(sampling: Sampling) -> Self {
        match sampling {
            Sampling::Triangular => SamplingMode::Triangular,
            Sampling::Uniform => SamplingMode::Uniform,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Chromosomes kept after each generation
    #[arg(long, default_value_t = 1000)]
    population: usize,
    /// Generations to evolve
    #[arg(long, default_value_t = 100)]
    generations: usize,
    /// How crossover mates are drawn from the fitness ranking
    #[arg(long, default_value = "triangular")]
    sampling: Sampling,
    /// Chromosomes reported per generation
    #[arg(long, default_value_t = 5)]
    show: usize,
    #[clap(flatten)]
    game: GameArg,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        population,
        generations,
        sampling,
        show,
        game,
        output,
    } = arg;
    anyhow::ensure!(*population > 0, "population must not be empty");

    let evaluator = FitnessEvaluator::new(game.fitness_config(), game.random_games());
    let bounds = AlleleBounds::default();

    let mut rng = rand::rng();
    let initial = Population::random(*population, WEIGHT_COUNT, bounds, &mut rng);
    let mut genotype = Genotype::new(
        initial,
        GenotypeConfig {
            population_size: *population,
        },
        WeightFitness::new(evaluator),
    );
    genotype.add_operator(MutationOperator {
        bounds,
        ..MutationOperator::default()
    });
    genotype.add_operator(BiasedCrossoverOperator::new(CrossoverConfig {
        population_size: *population,
        rate: CrossoverRate::default(),
        sampling: (*sampling).into(),
        ..CrossoverConfig::default()
    }));

    genotype.evaluate()?;
    report_generation(genotype.population(), 0, *show);
    for generation in 1..=*generations {
        genotype.evolve(&mut rng)?;
        report_generation(genotype.population(), generation, *show);
    }

    let best = genotype
        .fittest()
        .ok_or_else(|| anyhow::anyhow!("population is empty"))?;
    let model = WeightModel {
        trained_at: Utc::now(),
        fitness: best.fitness().unwrap_or_default(),
        weights: best.to_weights()?,
    };
    eprintln!("{sampling:?} training completed after {generations} generations.");

    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Fitness: {:.3}", model.fitness);
    eprintln!("  Weights: {}", model.weights);

    Ok(())
}

fn report_generation(population: &Population, generation: usize, show: usize) {
    eprintln!("Generation #{generation}:");

    eprintln!("  Fittest:");
    for (rank, &index) in population
        .indices_by_fitness()
        .iter()
        .rev()
        .take(show)
        .enumerate()
    {
        let chromosome = &population.chromosomes()[index];
        eprintln!(
            "  {rank:2}: [{}] => {:.3} (age {})",
            chromosome
                .alleles()
                .map(|a| format!("{a:.3}"))
                .collect::<Vec<_>>()
                .join(", "),
            chromosome.fitness().unwrap_or(f64::NAN),
            chromosome.age(),
        );
    }

    let allele_stats = population.allele_stats();
    if !allele_stats.is_empty() {
        let pick = |f: fn(&DescriptiveStats) -> f64| {
            allele_stats.iter().map(f).collect::<Vec<_>>()
        };
        #[expect(clippy::cast_precision_loss)]
        let spread = allele_stats
            .iter()
            .map(|s| s.normalized_std_dev)
            .sum::<f64>()
            / allele_stats.len() as f64;
        eprintln!("  Weights Stats:");
        eprintln!("    Min:        {:.3?}", pick(|s| s.min));
        eprintln!("    Max:        {:.3?}", pick(|s| s.max));
        eprintln!("    Mean:       {:.3?}", pick(|s| s.mean));
        eprintln!("    NormStddev: {:.3?}", pick(|s| s.normalized_std_dev));
        eprintln!("    => Mean:    {spread:.3}");
    }

    if let Some(stats) = population.fitness_stats() {
        eprintln!("  Fitness Stats:");
        eprintln!("    Min:    {:.3}", stats.min);
        eprintln!("    Max:    {:.3}", stats.max);
        eprintln!("    Mean:   {:.3}", stats.mean);
        eprintln!("    Median: {:.3}", stats.median);
    }
}
