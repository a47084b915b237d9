use crate::domain::{EvictionPolicy, IngredientRatios};
use crate::use_cases::SimulationSettings;
use std::{env, str::FromStr, time::Duration};
use tracing::warn;

// Runtime/server constants (not reaction or physics tuning).

pub const CONTROL_CHANNEL_CAPACITY: usize = 256;
pub const FRAME_BROADCAST_CAPACITY: usize = 128;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub fn http_port() -> u16 {
    env_or("SKETCH_SERVER_PORT", 3001)
}

// Out-of-range values fall back to the defaults with a warning.
pub const MAX_TICK_RATE_HZ: u32 = 1000;
// Collisions are all-pairs; the cost per tick grows with the square of this.
pub const MAX_PARTICLE_BUDGET: usize = 5000;

pub fn tick_interval() -> Duration {
    tick_interval_for(env_or("TICK_RATE_HZ", DEFAULT_TICK_RATE_HZ))
}

const DEFAULT_TICK_RATE_HZ: u32 = 60;

fn tick_interval_for(hz: u32) -> Duration {
    let hz = if hz == 0 || hz > MAX_TICK_RATE_HZ {
        warn!(hz, max = MAX_TICK_RATE_HZ, "TICK_RATE_HZ out of range; using default");
        DEFAULT_TICK_RATE_HZ
    } else {
        hz
    };
    // Never zero: `hz` is at most MAX_TICK_RATE_HZ here.
    Duration::from_secs(1) / hz
}

pub fn particle_budget() -> usize {
    let default = SimulationSettings::default().particle_budget;
    bounded_budget(env_or("PARTICLE_BUDGET", default), default)
}

fn bounded_budget(budget: usize, default: usize) -> usize {
    if budget == 0 || budget > MAX_PARTICLE_BUDGET {
        warn!(
            budget,
            max = MAX_PARTICLE_BUDGET,
            "PARTICLE_BUDGET out of range; using default"
        );
        default
    } else {
        budget
    }
}

/// Startup ingredient input. Not validated here; the server falls back to
/// the defaults when these don't add up.
pub fn initial_ratios() -> IngredientRatios {
    let defaults = IngredientRatios::default();
    IngredientRatios::new(
        env_or("INITIAL_KNO3_RATIO", defaults.kno3),
        env_or("INITIAL_CHARCOAL_RATIO", defaults.charcoal),
        env_or("INITIAL_SULFUR_RATIO", defaults.sulfur),
    )
}

pub fn eviction_policy() -> EvictionPolicy {
    let policy = env::var("EVICTION_POLICY").unwrap_or_default();
    parse_eviction_policy(&policy, env_or("EVICTION_SEED", 0))
}

fn parse_eviction_policy(name: &str, seed: u64) -> EvictionPolicy {
    match name.trim().to_ascii_lowercase().as_str() {
        "newest" => EvictionPolicy::NewestFirst,
        "random" => EvictionPolicy::Random { seed },
        _ => EvictionPolicy::OldestFirst,
    }
}

pub fn simulation_settings() -> SimulationSettings {
    SimulationSettings {
        particle_budget: particle_budget(),
        eviction: eviction_policy(),
        ..SimulationSettings::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_policy_name_is_known_then_it_is_parsed() {
        assert_eq!(parse_eviction_policy("newest", 0), EvictionPolicy::NewestFirst);
        assert_eq!(
            parse_eviction_policy(" Random ", 9),
            EvictionPolicy::Random { seed: 9 }
        );
        assert_eq!(parse_eviction_policy("oldest", 0), EvictionPolicy::OldestFirst);
    }

    #[test]
    fn when_policy_name_is_unknown_or_empty_then_oldest_first_is_used() {
        assert_eq!(parse_eviction_policy("", 0), EvictionPolicy::OldestFirst);
        assert_eq!(parse_eviction_policy("lifo", 0), EvictionPolicy::OldestFirst);
    }

    #[test]
    fn when_tick_rate_is_oversized_then_default_interval_is_used() {
        let interval = tick_interval_for(2_000_000_000);
        assert!(!interval.is_zero());
        assert_eq!(interval, Duration::from_secs(1) / DEFAULT_TICK_RATE_HZ);
    }

    #[test]
    fn when_tick_rate_is_zero_then_default_interval_is_used() {
        assert_eq!(tick_interval_for(0), Duration::from_secs(1) / DEFAULT_TICK_RATE_HZ);
    }

    #[test]
    fn when_tick_rate_is_in_range_then_it_sets_the_interval() {
        assert_eq!(tick_interval_for(MAX_TICK_RATE_HZ), Duration::from_millis(1));
        assert_eq!(tick_interval_for(50), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn when_tick_rate_is_oversized_then_interval_can_be_built() {
        // tokio panics on a zero period.
        let mut interval = tokio::time::interval(tick_interval_for(u32::MAX));
        interval.tick().await;
    }

    #[test]
    fn when_budget_exceeds_max_then_default_is_used() {
        assert_eq!(bounded_budget(100_000, 750), 750);
        assert_eq!(bounded_budget(0, 750), 750);
        assert_eq!(bounded_budget(MAX_PARTICLE_BUDGET, 750), MAX_PARTICLE_BUDGET);
        assert_eq!(bounded_budget(300, 750), 300);
    }

    #[test]
    fn when_variable_is_missing_then_default_is_returned() {
        assert_eq!(env_or("GUNPOWDER_TEST_UNSET_VARIABLE", 42u32), 42);
    }
}
