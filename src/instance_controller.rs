use async_trait::async_trait;

use crate::ec2_ops::{InstanceApi, RUNNING};
use crate::envelope::{ResponseEnvelope, STATUS_NOT_MODIFIED, STATUS_OK};
use crate::errors::ControllerError;
use crate::router::{PowerController, Route};
use crate::switch_types::ToggleResult;

/// Starts and stops a single EC2 instance. State is read fresh on every call.
pub struct InstanceController<A> {
    api: A,
    instance_id: String,
}

impl<A: InstanceApi> InstanceController<A> {
    pub fn new(api: A, instance_id: &str) -> Self {
        InstanceController { api, instance_id: instance_id.to_string() }
    }

    pub async fn check_state(&self) -> Result<bool, ControllerError> {
        let state = self.api.describe_state(&self.instance_id).await?;
        Ok(state.as_deref() == Some(RUNNING))
    }

    pub async fn turn_on(&self) -> Result<ToggleResult, ControllerError> {
        if self.check_state().await? {
            return Ok(ToggleResult::unchanged("Instance is already on"));
        }
        self.api.start(&self.instance_id).await?;
        Ok(ToggleResult::changed("Instance turned on"))
    }

    pub async fn turn_off(&self) -> Result<ToggleResult, ControllerError> {
        if !self.check_state().await? {
            return Ok(ToggleResult::unchanged("Instance is already off"));
        }
        self.api.stop(&self.instance_id).await?;
        Ok(ToggleResult::changed("Instance turned off"))
    }
}

fn toggle_envelope(result: ToggleResult) -> Result<ResponseEnvelope, ControllerError> {
    let status = if result.already_in_desired_state { STATUS_NOT_MODIFIED } else { STATUS_OK };
    ResponseEnvelope::message(status, &result.message)
}

#[async_trait]
impl<A: InstanceApi> PowerController for InstanceController<A> {
    async fn handle(&self, route: Route) -> Result<ResponseEnvelope, ControllerError> {
        match route {
            Route::On => toggle_envelope(self.turn_on().await?),
            Route::Off => toggle_envelope(self.turn_off().await?),
            Route::Status => ResponseEnvelope::not_found(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderError;
    use crate::router::dispatch;
    use std::sync::Mutex;

    struct FakeEc2 {
        state: Option<String>,
        fail_describe: bool,
        starts: Mutex<Vec<String>>,
        stops: Mutex<Vec<String>>,
    }

    impl FakeEc2 {
        fn with_state(state: &str) -> Self {
            FakeEc2 { state: Some(state.to_string()), fail_describe: false, starts: Mutex::new(vec![]), stops: Mutex::new(vec![]) }
        }

        fn failing() -> Self {
            FakeEc2 { fail_describe: true, ..FakeEc2::with_state(RUNNING) }
        }
    }

    #[async_trait]
    impl InstanceApi for FakeEc2 {
        async fn describe_state(&self, _instance_id: &str) -> Result<Option<String>, ControllerError> {
            if self.fail_describe {
                return Err(ProviderError { operation: "DescribeInstances", reason: "throttled".to_string() }.into());
            }
            Ok(self.state.clone())
        }

        async fn start(&self, instance_id: &str) -> Result<(), ControllerError> {
            self.starts.lock().unwrap().push(instance_id.to_string());
            Ok(())
        }

        async fn stop(&self, instance_id: &str) -> Result<(), ControllerError> {
            self.stops.lock().unwrap().push(instance_id.to_string());
            Ok(())
        }
    }

    fn controller(api: FakeEc2) -> InstanceController<FakeEc2> {
        InstanceController::new(api, "i-0123456789abcdef0")
    }

    #[tokio::test]
    async fn on_when_running_is_not_modified() {
        let c = controller(FakeEc2::with_state("running"));
        let envelope = dispatch(&c, "/on").await.unwrap();
        assert_eq!(envelope.status_code, 304);
        assert_eq!(envelope.body, r#"{"message":"Instance is already on"}"#);
        assert!(c.api.starts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn on_when_stopped_starts_once() {
        let c = controller(FakeEc2::with_state("stopped"));
        let envelope = dispatch(&c, "/on").await.unwrap();
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, r#"{"message":"Instance turned on"}"#);
        assert_eq!(*c.api.starts.lock().unwrap(), vec!["i-0123456789abcdef0".to_string()]);
        assert!(c.api.stops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn on_when_pending_still_starts() {
        let c = controller(FakeEc2::with_state("pending"));
        let result = c.turn_on().await.unwrap();
        assert!(!result.already_in_desired_state);
        assert_eq!(c.api.starts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn off_when_running_stops_once() {
        let c = controller(FakeEc2::with_state("running"));
        let envelope = dispatch(&c, "/off").await.unwrap();
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.body, r#"{"message":"Instance turned off"}"#);
        assert_eq!(c.api.stops.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn off_when_stopped_is_not_modified() {
        let c = controller(FakeEc2::with_state("stopped"));
        let envelope = dispatch(&c, "/off").await.unwrap();
        assert_eq!(envelope.status_code, 304);
        assert_eq!(envelope.body, r#"{"message":"Instance is already off"}"#);
        assert!(c.api.stops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_state_counts_as_off() {
        let c = controller(FakeEc2 { state: None, ..FakeEc2::with_state("") });
        assert!(!c.check_state().await.unwrap());
    }

    #[tokio::test]
    async fn status_is_not_served() {
        let c = controller(FakeEc2::with_state("running"));
        let envelope = dispatch(&c, "/status").await.unwrap();
        assert_eq!(envelope.status_code, 404);
        assert_eq!(envelope.body, r#"{"message":"Invalid URL"}"#);
    }

    #[tokio::test]
    async fn describe_failure_propagates() {
        let c = controller(FakeEc2::failing());
        let err = dispatch(&c, "/off").await.unwrap_err();
        assert!(matches!(err, ControllerError::Provider(ref e) if e.operation == "DescribeInstances"));
        assert!(c.api.stops.lock().unwrap().is_empty());
    }
}
