#[derive(Debug, Clone, PartialEq)]
pub struct ToggleResult {
    pub already_in_desired_state: bool,
    pub message: String,
}

impl ToggleResult {
    pub fn changed(message: &str) -> Self {
        ToggleResult { already_in_desired_state: false, message: message.to_string() }
    }

    pub fn unchanged(message: &str) -> Self {
        ToggleResult { already_in_desired_state: true, message: message.to_string() }
    }
}

/// Body of `/status`, serialized as is (no `message` wrapper).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GroupStatus {
    pub desired_capacity: i64,
    pub instance_id: String,
    pub launch_time: String,
}

/// Scalar view of an Auto Scaling Group as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSnapshot {
    pub desired_capacity: i64,
    pub instance_ids: Vec<String>,
}
