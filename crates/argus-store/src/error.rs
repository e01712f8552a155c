use argus_core::ids::ReportId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("report {0} not found")]
    NotFound(ReportId),

    #[error("report payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("store file: {0}")]
    Io(#[from] std::io::Error),

    #[error("store schema is version {found}, this build supports up to {supported}")]
    SchemaVersion { found: u32, supported: u32 },
}
