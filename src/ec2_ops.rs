use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_ec2::{DescribeInstancesRequest, Ec2, Ec2Client, Instance, StartInstancesRequest, StopInstancesRequest};
use std::fmt;
use tracing::{error, info};

use crate::errors::{ControllerError, ProviderError};

pub const RUNNING: &str = "running";

/// The EC2 calls needed to switch a single instance.
#[async_trait]
pub trait InstanceApi: Send + Sync {
    /// Current state name (`running`, `stopped`, ...), `None` if EC2 reports no state.
    async fn describe_state(&self, instance_id: &str) -> Result<Option<String>, ControllerError>;
    async fn start(&self, instance_id: &str) -> Result<(), ControllerError>;
    async fn stop(&self, instance_id: &str) -> Result<(), ControllerError>;
}

pub struct Ec2Ops {
    region: String,
    ec2_client: Ec2Client,
}

impl fmt::Debug for Ec2Ops {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{ region: {} }}", self.region)
    }
}

impl Ec2Ops {
    pub fn new(region: &str) -> Self {
        Self::with_client(region, Ec2Client::new(region.parse::<Region>().unwrap_or_default()))
    }

    pub fn with_client(region: &str, ec2_client: Ec2Client) -> Self {
        Ec2Ops { region: region.to_string(), ec2_client }
    }

    pub async fn describe_instance(&self, instance_id: &str) -> Result<Instance, ControllerError> {
        let input = DescribeInstancesRequest { instance_ids: Some(vec![instance_id.to_string()]), ..Default::default() };
        match self.ec2_client.describe_instances(input).await {
            Ok(output) => output
                .reservations
                .unwrap_or_default()
                .into_iter()
                .flat_map(|r| r.instances.unwrap_or_default())
                .next()
                .ok_or_else(|| ControllerError::InstanceNotFound(instance_id.to_string())),
            Err(err) => Err(ProviderError::new("DescribeInstances", err).into()),
        }
    }
}

#[async_trait]
impl InstanceApi for Ec2Ops {
    async fn describe_state(&self, instance_id: &str) -> Result<Option<String>, ControllerError> {
        let instance = self.describe_instance(instance_id).await?;
        Ok(instance.state.and_then(|s| s.name))
    }

    async fn start(&self, instance_id: &str) -> Result<(), ControllerError> {
        let input = StartInstancesRequest { instance_ids: vec![instance_id.to_string()], ..Default::default() };
        match self.ec2_client.start_instances(input).await {
            Ok(_) => {
                info!(instance_id, "start requested");
                Ok(())
            }
            Err(err) => {
                let err = ProviderError::new("StartInstances", err);
                error!("{}", err);
                Err(err.into())
            }
        }
    }

    async fn stop(&self, instance_id: &str) -> Result<(), ControllerError> {
        let input = StopInstancesRequest { instance_ids: vec![instance_id.to_string()], ..Default::default() };
        match self.ec2_client.stop_instances(input).await {
            Ok(_) => {
                info!(instance_id, "stop requested");
                Ok(())
            }
            Err(err) => {
                let err = ProviderError::new("StopInstances", err);
                error!("{}", err);
                Err(err.into())
            }
        }
    }
}
