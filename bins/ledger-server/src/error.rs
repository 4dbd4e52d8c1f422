#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("store: {0}")]
    Store(#[from] ledger_api::StoreError),

    #[error("bus: {0}")]
    Bus(#[from] ledger_api::BusError),

    #[error("{0}")]
    Query(#[from] ledger_engine::QueryError),

    #[error("{0}")]
    Serve(#[from] ledger_api_server::ServeError),

    #[error("subscriber task: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
