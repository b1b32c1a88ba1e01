use thiserror::Error;

pub const NO_INSTANCES_MESSAGE: &str = "No instances currently in the Auto Scaling Group";

/// A failed call against an AWS API, carrying the rusoto error text.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{operation} failed: {reason}")]
pub struct ProviderError {
    pub operation: &'static str,
    pub reason: String,
}

impl ProviderError {
    pub fn new<E: std::fmt::Display>(operation: &'static str, err: E) -> Self {
        ProviderError { operation, reason: err.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Auto Scaling Group {0} not found")]
    GroupNotFound(String),
    #[error("Instance {0} not found")]
    InstanceNotFound(String),
    /// Status was requested while the group has no members.
    #[error("{}", NO_INSTANCES_MESSAGE)]
    NoInstances,
    #[error("could not encode response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("one of ASG_NAME or INSTANCE_ID must be set")]
    MissingTarget,
    #[error("ASG_NAME and INSTANCE_ID are mutually exclusive")]
    AmbiguousTarget,
    #[error("{0} must not be blank")]
    Blank(&'static str),
}
