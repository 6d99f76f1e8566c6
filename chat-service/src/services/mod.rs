pub mod credentials;
pub mod metrics;
pub mod providers;

pub use credentials::{CredentialProvider, EnvCredentialProvider, StaticCredentialProvider};
