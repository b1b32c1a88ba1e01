use async_trait::async_trait;
use rusoto_autoscaling::{AutoScalingGroupNamesType, Autoscaling, AutoscalingClient, SetDesiredCapacityType};
use rusoto_core::Region;
use std::fmt;
use tracing::{error, info};

use crate::ec2_ops::Ec2Ops;
use crate::errors::{ControllerError, ProviderError};
use crate::switch_types::GroupSnapshot;

/// The Auto Scaling and EC2 calls needed to switch a group.
#[async_trait]
pub trait ScalingApi: Send + Sync {
    async fn describe_group(&self, group_name: &str) -> Result<GroupSnapshot, ControllerError>;
    async fn set_desired_capacity(&self, group_name: &str, capacity: i64, honor_cooldown: bool) -> Result<(), ControllerError>;
    async fn describe_launch_time(&self, instance_id: &str) -> Result<String, ControllerError>;
}

pub struct AsgOps {
    region: String,
    asg_client: AutoscalingClient,
    ec2: Ec2Ops,
}

impl fmt::Debug for AsgOps {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{ region: {} }}", self.region)
    }
}

impl AsgOps {
    pub fn new(region: &str) -> Self {
        Self::with_clients(region, AutoscalingClient::new(region.parse::<Region>().unwrap_or_default()), Ec2Ops::new(region))
    }

    pub fn with_clients(region: &str, asg_client: AutoscalingClient, ec2: Ec2Ops) -> Self {
        AsgOps { region: region.to_string(), asg_client, ec2 }
    }
}

#[async_trait]
impl ScalingApi for AsgOps {
    async fn describe_group(&self, group_name: &str) -> Result<GroupSnapshot, ControllerError> {
        let input = AutoScalingGroupNamesType {
            auto_scaling_group_names: Some(vec![group_name.to_string()]),
            ..Default::default()
        };
        let output = self
            .asg_client
            .describe_auto_scaling_groups(input)
            .await
            .map_err(|err| ProviderError::new("DescribeAutoScalingGroups", err))?;
        match output.auto_scaling_groups.into_iter().next() {
            Some(group) => Ok(GroupSnapshot {
                desired_capacity: group.desired_capacity,
                instance_ids: group.instances.unwrap_or_default().into_iter().map(|i| i.instance_id).collect(),
            }),
            None => Err(ControllerError::GroupNotFound(group_name.to_string())),
        }
    }

    async fn set_desired_capacity(&self, group_name: &str, capacity: i64, honor_cooldown: bool) -> Result<(), ControllerError> {
        let input = SetDesiredCapacityType {
            auto_scaling_group_name: group_name.to_string(),
            desired_capacity: capacity,
            honor_cooldown: Some(honor_cooldown),
        };
        match self.asg_client.set_desired_capacity(input).await {
            Ok(_) => {
                info!(group_name, capacity, "desired capacity updated");
                Ok(())
            }
            Err(err) => {
                let err = ProviderError::new("SetDesiredCapacity", err);
                error!("{}", err);
                Err(err.into())
            }
        }
    }

    /// Passed through as EC2 reports it (ISO-8601, e.g. `2024-03-01T09:30:00.000Z`).
    async fn describe_launch_time(&self, instance_id: &str) -> Result<String, ControllerError> {
        self.ec2.describe_instance(instance_id).await?.launch_time.ok_or_else(|| {
            ProviderError::new("DescribeInstances", format!("instance {} reported no launch time", instance_id)).into()
        })
    }
}
