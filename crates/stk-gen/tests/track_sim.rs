use stk_core::rng::RngHandle;
use stk_gen::profile::{ProfileParams, TagPosition};
use stk_gen::track::{generate_track, generate_tracks, TrackParams};

fn short_params() -> TrackParams {
    TrackParams {
        profile: ProfileParams {
            protein_length: 50.0,
            tag_length: 50.0,
            tag_repeats: 10,
            fluo_per_tag: 2.0,
            elongation_rate: 10.0,
            retention_time: 0.0,
            tag_position: TagPosition::Begin,
            step: 0.1,
            noise_std: None,
        },
        binding_rate: 0.5,
        track_length: 300.0,
        warmup: 100.0,
    }
}

#[test]
fn zero_binding_rate_yields_a_dark_track() {
    let params = TrackParams {
        binding_rate: 0.0,
        ..short_params()
    };
    let mut rng = RngHandle::from_seed(5);
    let track = generate_track(&params, &mut rng).unwrap();
    assert!(track.intensities.iter().all(|&v| v == 0.0));
    assert!(track.active_events.iter().all(|&n| n == 0));
}

#[test]
fn warmup_is_discarded_and_time_rebased() {
    let params = short_params();
    let mut rng = RngHandle::from_seed(5);
    let track = generate_track(&params, &mut rng).unwrap();
    // 300 s at 0.1 s minus the 100 s warm-up.
    assert_eq!(track.times.len(), 2000);
    assert_eq!(track.times[0], 0.0);
    assert!((track.times[1] - 0.1).abs() < 1e-12);
}

#[test]
fn saturated_binding_keeps_the_site_fully_occupied() {
    // binding_rate * step = 1: an event starts at every step, so every
    // retained sample sees exactly one event per profile sample.
    let params = TrackParams {
        binding_rate: 10.0,
        ..short_params()
    };
    let occupancy_samples =
        (params.profile.occupancy() / params.profile.step).ceil() as usize;
    let mut rng = RngHandle::from_seed(5);
    let track = generate_track(&params, &mut rng).unwrap();
    assert!(track
        .active_events
        .iter()
        .all(|&n| n as usize == occupancy_samples));
}

#[test]
fn batches_are_reproducible_and_tracks_independent() {
    let params = short_params();
    let batch_a = generate_tracks(3, &params, 2024).unwrap();
    let batch_b = generate_tracks(3, &params, 2024).unwrap();
    assert_eq!(batch_a.table, batch_b.table);
    assert_eq!(batch_a.provenance, batch_b.provenance);
    assert_eq!(batch_a.provenance.seed, 2024);
    assert!(!batch_a.provenance.input_hash.is_empty());

    let table = batch_a.table;
    assert_eq!(table.track_ids(), vec![0, 1, 2]);
    let first = table.select(0).unwrap();
    let second = table.select(1).unwrap();
    assert_eq!(first.frames.len(), second.frames.len());
    assert_ne!(first.intensities, second.intensities);
    assert_eq!(table.retention_time_of(2), Some(0.0));
}

#[test]
fn warmup_longer_than_track_is_rejected() {
    let params = TrackParams {
        warmup: 400.0,
        ..short_params()
    };
    let mut rng = RngHandle::from_seed(5);
    let err = generate_track(&params, &mut rng).unwrap_err();
    assert_eq!(err.info().code, "warmup-exceeds-track");
}
