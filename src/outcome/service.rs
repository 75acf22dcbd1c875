//! Request/response boundary between the authoritative side and consumers
//!
//! Every request draws from its own freshly seeded RNG, so concurrent
//! requests share nothing mutable beyond a request counter.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::generator::{DropOutcome, OutcomeGenerator};
use super::wire::DropResponse;
use crate::error::{PlinkoError, PlinkoResult};

/// Anything that can answer "give me an outcome"
pub trait OutcomeService: Send + Sync {
    fn request_outcome(&self) -> PlinkoResult<DropResponse>;
}

impl<F> OutcomeService for F
where
    F: Fn() -> PlinkoResult<DropResponse> + Send + Sync,
{
    fn request_outcome(&self) -> PlinkoResult<DropResponse> {
        self()
    }
}

#[derive(Debug)]
enum Entropy {
    /// Fresh OS entropy per request
    Os,
    /// Per-request streams derived from a master seed (reproducible runs)
    Seeded { master_seed: u64, next_request: AtomicU64 },
}

/// In-process outcome server
#[derive(Debug)]
pub struct OutcomeServer {
    generator: OutcomeGenerator,
    entropy: Entropy,
}

impl OutcomeServer {
    pub fn new(generator: OutcomeGenerator) -> Self {
        Self {
            generator,
            entropy: Entropy::Os,
        }
    }

    pub fn with_seed(generator: OutcomeGenerator, master_seed: u64) -> Self {
        Self {
            generator,
            entropy: Entropy::Seeded {
                master_seed,
                next_request: AtomicU64::new(0),
            },
        }
    }

    pub fn generator(&self) -> &OutcomeGenerator {
        &self.generator
    }

    fn request_rng(&self) -> PlinkoResult<Pcg32> {
        match &self.entropy {
            Entropy::Os => Pcg32::try_from_os_rng()
                .map_err(|e| PlinkoError::RandomSourceUnavailable(e.to_string())),
            Entropy::Seeded {
                master_seed,
                next_request,
            } => {
                let index = next_request.fetch_add(1, Ordering::Relaxed);
                let derived = master_seed ^ index.wrapping_mul(0x9e37_79b9_7f4a_7c15);
                Ok(Pcg32::seed_from_u64(derived))
            }
        }
    }

    /// Decide one drop
    pub fn draw(&self) -> PlinkoResult<DropOutcome> {
        let mut rng = self.request_rng()?;
        let outcome = self.generator.generate(&mut rng);
        log::debug!(
            "Drew bin {} ({}x) from walk {}",
            outcome.bin_index,
            outcome.multiplier,
            outcome.step_pattern.iter().map(|s| s.to_string()).collect::<String>()
        );
        Ok(outcome)
    }
}

impl OutcomeService for OutcomeServer {
    fn request_outcome(&self) -> PlinkoResult<DropResponse> {
        let outcome = self.draw()?;
        Ok(DropResponse::from_outcome(&outcome, self.generator.table()))
    }
}
