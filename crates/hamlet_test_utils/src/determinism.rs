//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Lockstep multiplayer only works if the simulation is 100% deterministic.
//! Sources of non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Player and building iteration always uses slot order / `BTreeMap`.
//!
//! - **System randomness**: No calls to `rand()` without explicit seeds.
//!   All "random" behavior uses a seeded `ChaCha8Rng`.
//!
//! - **Wall-clock time**: Never read inside the simulation; the status
//!   report reads it in the driver only.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual operations (economy, combat, commands)
//! 2. **Property tests**: Random command schedules stay reproducible
//! 3. **Integration tests**: Full headless runs produce identical
//!    checksum sequences

/// Result of a determinism verification run.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated per run.
    pub frames: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error
    /// message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `frames` - Number of game frames to simulate per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one frame
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use hamlet_test_utils::determinism::verify_determinism;
/// use hamlet_test_utils::fixtures::duel_world;
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 frames each
///     || duel_world(42),
///     |world| world.run_gf(),
///     |world| world.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..frames {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}
