use crate::errors::BrewResult;

/// Who a user is connected to.
pub trait ISocialGraph: Send + Sync {
    fn connections(&self, user_id: &str) -> BrewResult<Vec<String>>;
}
