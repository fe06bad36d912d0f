//! The three caller-supplied scalar functions (spec.md §6), with safe
//! invocation and error propagation across worker threads.
//!
//! Stored as `Arc<dyn Fn(...) + Send + Sync>` so they can be cloned cheaply
//! into each rayon stripe closure (spec.md §9's "trampoline" design note).

use std::sync::Arc;

use crate::error::{Error, ErrorKind};

/// `(sov_power, system_id, owner_id) -> f32`. Default: identity.
pub type SovPowerFn = Arc<dyn Fn(f32, u32, u32) -> f32 + Send + Sync>;

/// `(p0, hops, system_id) -> f32`. Default: `p0 / 2^hops`.
pub type PowerFalloffFn = Arc<dyn Fn(f32, u32, u32) -> f32 + Send + Sync>;

/// `(influence) -> u8` (clamped 0..=255). Default: `min(190, round(i*13))`.
pub type InfluenceToAlphaFn = Arc<dyn Fn(f32) -> u8 + Send + Sync>;

pub fn default_sov_power_fn() -> SovPowerFn {
    Arc::new(|sov_power, _system_id, _owner_id| sov_power)
}

pub fn default_power_falloff_fn() -> PowerFalloffFn {
    Arc::new(|p0, hops, _system_id| p0 / 2f32.powi(hops as i32))
}

pub fn default_influence_to_alpha_fn() -> InfluenceToAlphaFn {
    Arc::new(|influence| {
        let alpha = (influence * 13.0).round().min(190.0).max(0.0);
        alpha as u8
    })
}

/// Bundle of the three configurable functions plus the shared first-error
/// slot used to propagate a `CallbackError` out of parallel workers
/// (spec.md §5's cancellation model: the first error wins, other workers
/// finish their cheap remaining work).
#[derive(Clone)]
pub struct Functions {
    pub sov_power_fn: SovPowerFn,
    pub power_falloff_fn: PowerFalloffFn,
    pub influence_to_alpha_fn: InfluenceToAlphaFn,
}

impl Default for Functions {
    fn default() -> Self {
        Functions {
            sov_power_fn: default_sov_power_fn(),
            power_falloff_fn: default_power_falloff_fn(),
            influence_to_alpha_fn: default_influence_to_alpha_fn(),
        }
    }
}

/// A slot that keeps the first `CallbackError` reported by any worker,
/// across threads. Subsequent errors are dropped on the floor intentionally
/// (spec.md §7: "only the first such error per render is kept").
#[derive(Default)]
pub struct FirstError {
    slot: std::sync::Mutex<Option<Error>>,
}

impl FirstError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, err: Error) {
        let mut slot = self.slot.lock().unwrap();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    pub fn into_result(self) -> Result<(), Error> {
        match self.slot.into_inner().unwrap() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Invokes a caller-supplied function, catching panics and turning them
/// into a `CallbackError` rather than unwinding across the worker boundary.
pub fn invoke_guarded<F, R>(what: &str, f: F) -> Result<R, Error>
where
    F: FnOnce() -> R + std::panic::UnwindSafe,
{
    std::panic::catch_unwind(f).map_err(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with non-string payload".to_string());
        ErrorKind::CallbackError(format!("{} panicked: {}", what, msg)).into()
    })
}
