use crate::errors::BrewResult;

/// A dependency check timed by the health reporter.
pub trait IHealthProbe: Send + Sync {
    fn name(&self) -> &str;
    fn probe(&self) -> BrewResult<()>;
}
