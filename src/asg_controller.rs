use async_trait::async_trait;

use crate::asg_ops::ScalingApi;
use crate::envelope::{ResponseEnvelope, STATUS_OK};
use crate::errors::ControllerError;
use crate::router::{PowerController, Route};
use crate::switch_types::{GroupStatus, ToggleResult};

const ON_CAPACITY: i64 = 1;
const OFF_CAPACITY: i64 = 0;

/// Switches an Auto Scaling Group between zero and one desired instances.
///
/// Reading and then writing the desired capacity is not atomic: two requests
/// racing on the same group may both observe the old value and both write.
pub struct AutoScalingGroupController<A> {
    api: A,
    group_name: String,
}

impl<A: ScalingApi> AutoScalingGroupController<A> {
    pub fn new(api: A, group_name: &str) -> Self {
        AutoScalingGroupController { api, group_name: group_name.to_string() }
    }

    /// Always honors the group's cooldown. A rejection is returned as is.
    pub async fn set_desired_capacity(&self, capacity: i64) -> Result<(), ControllerError> {
        self.api.set_desired_capacity(&self.group_name, capacity, true).await
    }

    pub async fn describe_desired_capacity(&self) -> Result<i64, ControllerError> {
        Ok(self.api.describe_group(&self.group_name).await?.desired_capacity)
    }

    /// Desired capacity with the first member's id and launch time.
    ///
    /// A group without members is an error ([`ControllerError::NoInstances`]),
    /// so callers never receive a partial status.
    pub async fn get_status(&self) -> Result<GroupStatus, ControllerError> {
        let group = self.api.describe_group(&self.group_name).await?;
        let instance_id = match group.instance_ids.into_iter().next() {
            Some(id) => id,
            None => return Err(ControllerError::NoInstances),
        };
        let launch_time = self.api.describe_launch_time(&instance_id).await?;
        Ok(GroupStatus { desired_capacity: group.desired_capacity, instance_id, launch_time })
    }

    pub async fn turn_on(&self) -> Result<ToggleResult, ControllerError> {
        self.switch_to(ON_CAPACITY).await
    }

    pub async fn turn_off(&self) -> Result<ToggleResult, ControllerError> {
        self.switch_to(OFF_CAPACITY).await
    }

    async fn switch_to(&self, capacity: i64) -> Result<ToggleResult, ControllerError> {
        if self.describe_desired_capacity().await? == capacity {
            return Ok(ToggleResult::unchanged(&format!("Desired Capacity is already {}", capacity)));
        }
        self.set_desired_capacity(capacity).await?;
        Ok(ToggleResult::changed(&format!("Desired Capacity set to {}", capacity)))
    }
}

#[async_trait]
impl<A: ScalingApi> PowerController for AutoScalingGroupController<A> {
    async fn handle(&self, route: Route) -> Result<ResponseEnvelope, ControllerError> {
        // Both outcomes of a toggle are 200 for groups.
        match route {
            Route::On => ResponseEnvelope::message(STATUS_OK, &self.turn_on().await?.message),
            Route::Off => ResponseEnvelope::message(STATUS_OK, &self.turn_off().await?.message),
            Route::Status => ResponseEnvelope::json(STATUS_OK, &self.get_status().await?),
        }
    }
}
