use structopt::StructOpt;

use crate::errors::ConfigError;

/// Every option falls back to the environment, the Lambda runtime passes no arguments.
#[derive(StructOpt, Debug)]
#[structopt(name = "instance_switch",
    about = "Instance Switch - Turns an EC2 instance or Auto Scaling Group on and off from a function URL."
)]
pub struct Opt {
    /// AWS Region
    #[structopt(short = "r", long = "region", env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,
    /// Auto Scaling Group to switch between 0 and 1 desired instances
    #[structopt(long = "asg-name", env = "ASG_NAME")]
    pub asg_name: Option<String>,
    /// EC2 Instance to start and stop
    #[structopt(long = "instance-id", env = "INSTANCE_ID")]
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    AutoScalingGroup(String),
    Instance(String),
}

/// Validated configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub region: String,
    pub target: Target,
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Opt {
    /// Blank values count as unset, so an empty `INSTANCE_ID` next to a real
    /// `ASG_NAME` still selects the group.
    pub fn into_config(self) -> Result<ControllerConfig, ConfigError> {
        let target = match (present(&self.asg_name), present(&self.instance_id)) {
            (Some(_), Some(_)) => return Err(ConfigError::AmbiguousTarget),
            (Some(name), None) => Target::AutoScalingGroup(name),
            (None, Some(id)) => Target::Instance(id),
            (None, None) if self.asg_name.is_some() => return Err(ConfigError::Blank("ASG_NAME")),
            (None, None) if self.instance_id.is_some() => return Err(ConfigError::Blank("INSTANCE_ID")),
            (None, None) => return Err(ConfigError::MissingTarget),
        };
        Ok(ControllerConfig { region: self.region, target })
    }
}
