use rand::{rngs::StdRng, SeedableRng};

use karasu::simulate::{simulate, simulate_with_rng, SimulationParams};

fn params(pack_count: u32, member_count: u32, cut_count: u32, one_pack_size: u32) -> SimulationParams {
    SimulationParams {
        pack_count,
        member_count,
        cut_count,
        one_pack_size,
    }
}

#[test]
fn no_packs_means_nothing_collected() {
    let result = simulate(params(0, 20, 4, 3));
    assert_eq!(result.comp_mean, 0.0);
    assert_eq!(result.coverage_mean, 0.0);
    assert_eq!(result.comp_stderr, 0.0);
    assert_eq!(result.coverage_stderr, 0.0);
}

#[test]
fn single_member_single_cut_is_deterministic() {
    let result = simulate(params(12, 1, 1, 1));
    assert_eq!(result.comp_mean, 12.0);
    assert_eq!(result.coverage_mean, 1.0);
    assert_eq!(result.comp_stderr, 0.0);
}

#[test]
fn drawing_every_member_covers_everyone() {
    // One cut type and a full draw: every member gets one copy per pack.
    let result = simulate(params(2, 5, 1, 5));
    assert_eq!(result.comp_mean, 10.0);
    assert_eq!(result.coverage_mean, 5.0);
}

#[test]
fn seeded_runs_are_reproducible() {
    let p = params(10, 12, 4, 3);
    let a = simulate_with_rng(p, &mut StdRng::seed_from_u64(42));
    let b = simulate_with_rng(p, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
}

#[test]
fn estimates_stay_within_bounds() {
    let p = params(30, 10, 4, 2);
    let result = simulate_with_rng(p, &mut StdRng::seed_from_u64(7));
    // 60 draws over 40 (member, cut) slots.
    assert!(result.coverage_mean > 0.0 && result.coverage_mean <= 40.0);
    assert!(result.comp_mean >= 0.0 && result.comp_mean <= 60.0 / 4.0);
    assert!(result.coverage_stderr > 0.0);
}

#[test]
fn out_of_range_inputs_are_clamped() {
    // Draw size above the member count behaves like drawing everyone.
    let result = simulate(params(1, 3, 1, 50));
    assert_eq!(result.coverage_mean, 3.0);
}
