use crate::domain::courier::CourierId;
use crate::domain::motorcycle::MotorcycleId;
use crate::domain::rental::RentalId;
use thiserror::Error;

/// Failures reported by a [`RecordStore`](crate::domain::ports::RecordStore).
#[derive(Error, Debug)]
pub enum StorageError {
    /// A guarded write found the record in a different state than expected.
    #[error("write conflict: {0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PricingError {
    #[error("invalid plan of {0} days, use 7, 15, 30, 45 or 50")]
    InvalidPlan(u32),
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum EligibilityError {
    #[error("motorcycle not found")]
    MotorcycleNotFound,
    #[error("motorcycle is not available for rental")]
    MotorcycleUnavailable,
    #[error("courier not found")]
    CourierNotFound,
    #[error("courier is not enabled")]
    CourierNotEnabled,
    #[error("courier must hold a category A license to rent motorcycles")]
    CourierNotLicensedForCategory,
}

#[derive(Error, Debug)]
pub enum OpenError {
    #[error("invalid plan of {0} days, use 7, 15, 30, 45 or 50")]
    InvalidPlan(u32),
    #[error(transparent)]
    Ineligible(#[from] EligibilityError),
    #[error("rental {0} already exists")]
    RentalAlreadyExists(RentalId),
    #[error("rental dates fall outside the supported calendar")]
    DateOutOfRange,
    #[error("rental could not be opened due to concurrent changes: {0}")]
    Conflict(String),
    #[error(transparent)]
    StorageUnavailable(StorageError),
}

impl From<PricingError> for OpenError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidPlan(days) => Self::InvalidPlan(days),
        }
    }
}

impl From<StorageError> for OpenError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(msg) => Self::Conflict(msg),
            other => Self::StorageUnavailable(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum CompleteError {
    #[error("rental not found")]
    RentalNotFound,
    #[error("rental is not active")]
    RentalNotActive,
    #[error("return date cannot be before start date")]
    ReturnDateBeforeStart,
    #[error("rental could not be completed due to concurrent changes: {0}")]
    Conflict(String),
    #[error(transparent)]
    StorageUnavailable(StorageError),
}

impl From<StorageError> for CompleteError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(msg) => Self::Conflict(msg),
            other => Self::StorageUnavailable(other),
        }
    }
}

/// Failures of courier and motorcycle management.
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("courier {0} is already registered")]
    DuplicateCourier(CourierId),
    #[error("license number {0} is already registered")]
    LicenseNumberTaken(String),
    #[error("CNPJ {0} is already registered")]
    CnpjTaken(String),
    #[error("courier {0} not found")]
    CourierNotFound(CourierId),
    #[error("motorcycle {0} is already registered")]
    DuplicateMotorcycle(MotorcycleId),
    #[error("license plate {0} is already registered")]
    PlateAlreadyRegistered(String),
    #[error("motorcycle {0} not found")]
    MotorcycleNotFound(MotorcycleId),
    #[error("motorcycle {0} has rental history and cannot be removed")]
    HasRentalHistory(MotorcycleId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("event channel closed")]
    ChannelClosed,
    #[error("event encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A batch row that parsed as CSV but does not describe a usable command.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("missing field `{field}` for `{command}` command")]
    MissingField {
        command: &'static str,
        field: &'static str,
    },
    #[error("unknown license category `{0}`")]
    UnknownLicense(String),
}

/// Errors surfaced by the batch front end.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Open(#[from] OpenError),
    #[error(transparent)]
    Complete(#[from] CompleteError),
    #[error(transparent)]
    Fleet(#[from] FleetError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
