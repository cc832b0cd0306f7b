//! Property/fuzz-style invariants for strip layout operations.
//!
//! This suite exercises random operation streams against the public Strip
//! API and asserts the ordering/overlap invariant, deterministic replay,
//! and snapshot round-trips after each mutation.

use dstrip_layout::{Orientation, SlotKey, SlotSpec, Strip};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self {
            state: seed ^ 0x9E37_79B9_7F4A_7C15,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    fn next_i32_range(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        if min == max {
            return min;
        }
        let span = (max - min + 1) as u64;
        min + (self.next_u64() % span) as i32
    }

    fn choose_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    fn choose_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 0
    }
}

#[derive(Debug, Clone)]
enum StripOp {
    Add {
        key: SlotKey,
        position: i32,
        cells: i32,
        min_cells: i32,
        locked: bool,
    },
    Remove {
        key: SlotKey,
    },
    Resize {
        length: i32,
    },
    Switch {
        key: SlotKey,
        delta: i32,
    },
    Push {
        key: SlotKey,
        delta: i32,
    },
    Free {
        key: SlotKey,
        target: i32,
    },
}

fn placed_keys(strip: &Strip) -> Vec<SlotKey> {
    strip.slots().map(|slot| slot.key()).collect()
}

fn random_operation(strip: &Strip, rng: &mut Lcg, next_key: &mut u64) -> StripOp {
    let keys = placed_keys(strip);
    let length = strip.length();

    let mut candidates = vec![0usize]; // Add (always attempted)
    candidates.push(1); // Resize
    if !keys.is_empty() {
        candidates.push(2); // Remove
        candidates.push(3); // Switch
        candidates.push(4); // Push
        candidates.push(5); // Free
    }

    let op_kind = candidates[rng.choose_index(candidates.len())];
    match op_kind {
        1 => StripOp::Resize {
            length: rng.next_i32_range(20, 400),
        },
        2 => StripOp::Remove {
            key: keys[rng.choose_index(keys.len())],
        },
        3 => StripOp::Switch {
            key: keys[rng.choose_index(keys.len())],
            delta: rng.next_i32_range(-40, 40),
        },
        4 => StripOp::Push {
            key: keys[rng.choose_index(keys.len())],
            delta: rng.next_i32_range(-40, 40),
        },
        5 => StripOp::Free {
            key: keys[rng.choose_index(keys.len())],
            target: rng.next_i32_range(-10, length + 10),
        },
        _ => {
            let min_cells = rng.next_i32_range(1, 12);
            let key = SlotKey::new(*next_key).expect("counter starts at 1");
            *next_key += 1;
            StripOp::Add {
                key,
                position: rng.next_i32_range(0, length),
                cells: min_cells + rng.next_i32_range(0, 12),
                min_cells,
                locked: rng.choose_bool() && rng.choose_bool(),
            }
        }
    }
}

fn apply(strip: &mut Strip, op: &StripOp) {
    match *op {
        StripOp::Add {
            key,
            position,
            cells,
            min_cells,
            locked,
        } => {
            let mut spec = SlotSpec::fixed(cells).with_min_cells(min_cells);
            if locked {
                spec = spec.locked();
            }
            // A full strip legitimately refuses placement.
            let _ = strip.add(key, position, spec);
        }
        StripOp::Remove { key } => {
            let _ = strip.remove(key);
        }
        StripOp::Resize { length } => strip.resize(length),
        StripOp::Switch { key, delta } => {
            let _ = strip.switch_move(key, delta);
        }
        StripOp::Push { key, delta } => {
            let _ = strip.push_move(key, delta);
        }
        StripOp::Free { key, target } => {
            let _ = strip.free_move(key, target);
        }
    }
}

fn assert_strip_invariants(strip: &Strip, seed: u64, step: usize, op: &StripOp) {
    strip.validate().unwrap_or_else(|violation| {
        panic!("invariant broken at step {step}, seed={seed}, op={op:?}: {violation}")
    });
    for slot in strip.slots() {
        assert!(
            slot.cells() >= slot.min_cells(),
            "slot compressed below minimum at step {step}, seed={seed}"
        );
    }
}

fn run_sequence(seed: u64, steps: usize, packed: bool) -> (Strip, Vec<StripOp>) {
    let mut strip = if packed {
        Strip::new_packed(200, 4, Orientation::Horizontal)
    } else {
        Strip::new(200, 4, Orientation::Horizontal)
    };
    let mut rng = Lcg::new(seed);
    let mut next_key = 1u64;
    let mut applied = Vec::with_capacity(steps);

    for step in 0..steps {
        let op = random_operation(&strip, &mut rng, &mut next_key);
        apply(&mut strip, &op);
        assert_strip_invariants(&strip, seed, step, &op);
        // Event queue must drain without growing unboundedly.
        let _ = strip.take_events();
        applied.push(op);
    }

    (strip, applied)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn strip_random_operation_sequences_preserve_invariants(
        seed in any::<u64>(),
        steps in 20usize..120,
    ) {
        let (strip, _) = run_sequence(seed, steps, false);
        strip.validate().expect("final state valid");
    }

    #[test]
    fn packed_strip_random_operation_sequences_preserve_invariants(
        seed in any::<u64>(),
        steps in 20usize..120,
    ) {
        let (strip, _) = run_sequence(seed, steps, true);
        strip.validate().expect("final state valid");
    }

    #[test]
    fn strip_random_operation_sequences_replay_deterministically(
        seed in any::<u64>(),
        steps in 20usize..80,
    ) {
        let (final_strip, operations) = run_sequence(seed, steps, false);
        let final_hash = final_strip.state_hash();

        let mut replay = Strip::new(200, 4, Orientation::Horizontal);
        for op in &operations {
            apply(&mut replay, op);
            let _ = replay.take_events();
        }

        assert_eq!(
            replay.state_hash(),
            final_hash,
            "same operation sequence should produce identical state hash"
        );
        assert_eq!(
            replay.snapshot(),
            final_strip.snapshot(),
            "same operation sequence should produce identical snapshot"
        );
    }

    #[test]
    fn strip_snapshot_round_trips_after_random_sequences(
        seed in any::<u64>(),
        steps in 20usize..80,
    ) {
        let (strip, _) = run_sequence(seed, steps, false);
        let restored = Strip::from_snapshot(strip.snapshot())
            .expect("snapshot of a valid strip should load");
        assert_eq!(restored.state_hash(), strip.state_hash());
    }
}

#[test]
fn strip_fuzz_seed_corpus_preserves_invariants() {
    let seeds = [
        0_u64,
        1,
        2,
        3,
        5,
        8,
        13,
        21,
        34,
        55,
        89,
        144,
        u32::MAX as u64,
        (u32::MAX as u64) + 1,
        u64::MAX - 1,
        u64::MAX,
    ];

    for seed in seeds {
        let (strip, _) = run_sequence(seed, 180, false);
        strip.validate().expect("final state valid");
        let (packed, _) = run_sequence(seed, 180, true);
        packed.validate().expect("final packed state valid");
    }
}
