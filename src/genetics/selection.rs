use std::collections::HashMap;
use std::sync::Arc;

use crate::error::BreedError;
use crate::model::{Bar, BarId, Population};

#[derive(Debug, Clone)]
pub struct Selection {
    pub parents: Vec<Arc<Bar>>,
    pub total_votes: u64,
    /// True when every bar was made eligible because nobody voted or no bar
    /// beat the average.
    pub uniform: bool,
}

/// Picks the bars allowed to parent the next generation.
///
/// Only vote entries for bars still in `population` count. Bars strictly
/// above the mean count (over the voted entries) are eligible; with no votes,
/// or when nothing beats the mean, every bar is.
pub fn select_parents(
    population: &Population,
    votes: &HashMap<BarId, u32>,
) -> Result<Selection, BreedError> {
    if population.is_empty() {
        return Err(BreedError::EmptyParentSet);
    }

    let tallied: Vec<(&Arc<Bar>, u32)> = population
        .iter()
        .filter_map(|bar| votes.get(&bar.id).map(|&count| (bar, count)))
        .collect();
    let total_votes: u64 = tallied.iter().map(|&(_, count)| count as u64).sum();

    if total_votes > 0 {
        let average = total_votes as f64 / tallied.len() as f64;
        let parents: Vec<Arc<Bar>> = tallied
            .iter()
            .filter(|&&(_, count)| count as f64 > average)
            .map(|&(bar, _)| Arc::clone(bar))
            .collect();
        if !parents.is_empty() {
            return Ok(Selection {
                parents,
                total_votes,
                uniform: false,
            });
        }
    }

    Ok(Selection {
        parents: population.bars().to_vec(),
        total_votes,
        uniform: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::genetics::generate_population;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn population(size: usize) -> Population {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let config = Config {
            population_size: size,
            min_notes_per_bar: 1,
            max_notes_per_bar: 1,
            ..Config::default()
        };
        generate_population(&mut rng, &config)
    }

    fn votes(population: &Population, counts: &[u32]) -> HashMap<BarId, u32> {
        population.ids().zip(counts.iter().copied()).collect()
    }

    fn parent_ids(selection: &Selection) -> Vec<BarId> {
        selection.parents.iter().map(|bar| bar.id).collect()
    }

    #[test]
    fn no_votes_makes_everyone_eligible() {
        let population = population(3);
        let selection = select_parents(&population, &votes(&population, &[0, 0, 0])).unwrap();
        assert!(selection.uniform);
        assert_eq!(selection.total_votes, 0);
        assert_eq!(parent_ids(&selection), population.ids().collect::<Vec<_>>());

        let selection = select_parents(&population, &HashMap::new()).unwrap();
        assert!(selection.uniform);
        assert_eq!(selection.parents.len(), 3);
    }

    #[test]
    fn only_bars_above_average_are_eligible() {
        let population = population(4);
        let selection = select_parents(&population, &votes(&population, &[1, 5, 0, 6])).unwrap();
        assert!(!selection.uniform);
        assert_eq!(selection.total_votes, 12);
        let ids: Vec<_> = population.ids().collect();
        assert_eq!(parent_ids(&selection), vec![ids[1], ids[3]]);
    }

    #[test]
    fn single_winner_is_sole_parent() {
        let population = population(5);
        let selection = select_parents(&population, &votes(&population, &[0, 0, 9, 0, 0])).unwrap();
        assert_eq!(parent_ids(&selection), vec![population.bars()[2].id]);
    }

    #[test]
    fn ties_at_average_fall_back_to_everyone() {
        let population = population(3);
        let selection = select_parents(&population, &votes(&population, &[2, 2, 2])).unwrap();
        assert!(selection.uniform);
        assert_eq!(selection.total_votes, 6);
        assert_eq!(selection.parents.len(), 3);
    }

    #[test]
    fn votes_for_departed_bars_are_ignored() {
        let population = population(2);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let stranger = BarId::random(&mut rng);
        let selection = select_parents(&population, &HashMap::from([(stranger, 40)])).unwrap();
        assert!(selection.uniform);
        assert_eq!(selection.total_votes, 0);
    }

    #[test]
    fn empty_population_is_rejected() {
        assert_eq!(
            select_parents(&Population::default(), &HashMap::new()).unwrap_err(),
            BreedError::EmptyParentSet
        );
    }
}
