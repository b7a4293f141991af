//! Session-scoped UI state.
//!
//! One instance per user session, passed by reference into page assembly.
//! Nothing here is process-global, so concurrent sessions with different
//! selections cannot clobber each other.

use crate::catalog::{self, CoinInfo};

#[derive(Debug, Clone)]
pub struct SessionState {
    active_coin: &'static CoinInfo,
}

impl SessionState {
    /// Fresh session with the first major coin active.
    pub fn new() -> Self {
        Self {
            active_coin: &catalog::MAJOR_COINS[0],
        }
    }

    pub fn active_coin(&self) -> &CoinInfo {
        self.active_coin
    }

    /// Switch the active coin. Unknown ids leave the selection unchanged
    /// and report false.
    pub fn select_coin(&mut self, id: &str) -> bool {
        match catalog::find_coin(id) {
            Some(coin) => {
                self.active_coin = coin;
                true
            }
            None => false,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
