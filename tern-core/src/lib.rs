pub mod booking;
pub mod gateway;
pub mod identity;
pub mod model;
pub mod query;
pub mod store;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Identity(#[from] identity::IdentityError),
    #[error(transparent)]
    Store(#[from] store::StoreError),
}

pub type CoreResult<T> = Result<T, CoreError>;
