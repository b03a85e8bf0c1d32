use thiserror::Error;

/// All errors that can occur in CryptHub.
#[derive(Debug, Error)]
pub enum CryptHubError {
    // --- Session errors ---
    #[error("Vault is locked; unlock it with the master password first")]
    VaultLocked,

    #[error("Vault is already initialized with a master password")]
    AlreadyInitialized,

    #[error("No master password set; run `crypthub init` first")]
    NoCredential,

    #[error("Wrong password")]
    WrongPassword,

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: authentication tag mismatch")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Random source failed: {0}")]
    RandomSource(String),

    // --- Bundle errors ---
    #[error("File is too small or corrupt: {0}")]
    CorruptFile(String),

    #[error("Not a valid CryptHub backup file: {0}")]
    UnrecognizedFormat(String),

    #[error("Wrong master password or corrupted file")]
    WrongPasswordOrCorrupt,

    #[error("Vault signature mismatch: file may be tampered with")]
    SignatureMismatch,

    // --- Store errors ---
    #[error("Entry {0} could not be decrypted: stored data is corrupted")]
    DataCorruption(i64),

    #[error("Entry {0} not found")]
    EntryNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for CryptHub results.
pub type Result<T> = std::result::Result<T, CryptHubError>;
