use thiserror::Error;

/// 写入路径（分发登记、CSV 导入）的错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    #[error("insufficient stock for resource {resource_id}: available {available}, requested {requested}")]
    InsufficientStock {
        resource_id: i32,
        available: i32,
        requested: i32,
    },

    #[error("csv error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error("invalid value in {file}: {message}")]
    InvalidRow { file: String, message: String },
}
