//! Generation turnover driven through the public API, without threads or
//! wall-clock waits.

use barbreeder::{Conductor, ConductorUpdate, Config, VoteError, VoteStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::sync::Arc;

fn conductor(config: Config, seed: u64) -> Conductor {
    Conductor::with_rng(config, Arc::new(VoteStore::new()), ChaCha8Rng::seed_from_u64(seed))
        .expect("valid config")
}

#[test]
fn silent_generation_is_replaced_with_fresh_entries() {
    let mut conductor = conductor(
        Config {
            population_size: 2,
            min_notes_per_bar: 1,
            max_notes_per_bar: 1,
            note_seconds: 0.0,
            ..Config::default()
        },
        1,
    );
    let votes = conductor.votes();
    let old: HashSet<_> = conductor.population().ids().collect();

    let update = conductor.advance_generation();
    assert!(matches!(update, ConductorUpdate::GenerationBred { uniform: true, total_votes: 0, .. }));

    let new: HashSet<_> = conductor.population().ids().collect();
    assert_eq!(new.len(), 2);
    assert!(new.is_disjoint(&old));
    assert_eq!(votes.snapshot().keys().copied().collect::<HashSet<_>>(), new);
    assert!(votes.snapshot().values().all(|&count| count == 0));
    for bar in conductor.population().iter() {
        assert_eq!(bar.notes.len(), 1);
    }
}

#[test]
fn unknown_bar_vote_leaves_store_untouched() {
    let conductor = conductor(Config::default(), 2);
    let votes = conductor.votes();
    let playing = conductor.current_bar().load().id;
    votes.increment(playing).unwrap();
    let before = votes.snapshot();

    let stranger = barbreeder::BarId::random(&mut ChaCha8Rng::seed_from_u64(77));
    assert_eq!(votes.increment(stranger), Err(VoteError::UnknownBar(stranger)));
    assert_eq!(votes.snapshot(), before);
    assert_eq!(votes.total(), 1);
}

#[test]
fn late_votes_for_the_old_generation_are_rejected() {
    let mut conductor = conductor(
        Config {
            population_size: 3,
            min_notes_per_bar: 2,
            max_notes_per_bar: 4,
            note_seconds: 0.0,
            ..Config::default()
        },
        3,
    );
    let votes = conductor.votes();
    let old_bar = conductor.current_bar().load().id;
    votes.increment(old_bar).unwrap();

    conductor.advance_generation();

    assert!(votes.increment(old_bar).is_err());
    assert_eq!(votes.total(), 0);
    let now_playing = conductor.current_bar().load().id;
    assert_eq!(votes.increment(now_playing), Ok(1));
}

#[test]
fn many_voted_generations_keep_notes_in_range() {
    let config = Config {
        population_size: 6,
        min_notes_per_bar: 2,
        max_notes_per_bar: 8,
        note_seconds: 0.0,
        ..Config::default()
    };
    let mut conductor = conductor(config.clone(), 4);
    let votes = conductor.votes();

    for generation in 1..=40u64 {
        // Favour the bars at odd positions.
        let ids: Vec<_> = conductor.population().ids().collect();
        for (i, id) in ids.iter().enumerate() {
            for _ in 0..(i % 2) * 3 {
                votes.increment(*id).unwrap();
            }
        }

        match conductor.advance_generation() {
            ConductorUpdate::GenerationBred { generation: bred, .. } => assert_eq!(bred, generation),
            other => panic!("unexpected update {:?}", other),
        }

        assert_eq!(conductor.population().len(), 6);
        for bar in conductor.population().iter() {
            assert!((2..=8).contains(&bar.notes.len()));
            for note in &bar.notes {
                assert!(config.pitch.contains(note.pitch));
                assert!(config.velocity.contains(note.velocity));
                assert!((0.0..1.0).contains(&note.end));
            }
        }
    }
    assert_eq!(conductor.generation(), 40);
}
