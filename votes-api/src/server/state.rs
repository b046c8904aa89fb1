// App state for the Axum server
use std::sync::Arc;

use votes_ledger::VoteLedger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<VoteLedger>,
}
