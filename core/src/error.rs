use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrawError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Catalog is empty")]
    EmptyCatalog,

    #[error("Winner index {index} out of range for tape length {length}")]
    WinnerIndexOutOfRange { index: usize, length: usize },

    #[error("Insufficient funds: balance {balance}, price {price}")]
    InsufficientFunds { balance: i64, price: i64 },

    #[error("Profile store rejected the debit for '{profile_id}'")]
    DebitFailed { profile_id: String },

    #[error("Inventory grant failed for item '{item_id}' (debit refunded: {refunded})")]
    GrantFailed { item_id: String, refunded: bool },

    #[error("A draw is already in progress")]
    DrawInProgress,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, DrawError>;
