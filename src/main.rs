#[macro_use]
extern crate serde_derive;

extern crate serde;
extern crate serde_json;
extern crate rusoto_core;
extern crate rusoto_ec2;
extern crate rusoto_autoscaling;

use std::process;

use aws_lambda_events::event::lambda_function_urls::LambdaFunctionUrlRequest;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use args::*;
use asg_controller::AutoScalingGroupController;
use asg_ops::AsgOps;
use ec2_ops::Ec2Ops;
use envelope::ResponseEnvelope;
use errors::ControllerError;
use instance_controller::InstanceController;
use router::PowerController;

mod args;
mod asg_controller;
mod asg_ops;
mod ec2_ops;
mod envelope;
mod errors;
mod instance_controller;
mod router;
mod switch_types;

/// Instance Switch
/// Function URL handler
/// /on => start the instance, or set the group's desired capacity to 1
/// /off => stop the instance, or set the group's desired capacity to 0
/// /status => desired capacity, first member and its launch time (groups only)
/// anything else => 404 Invalid URL
///
/// Configuration (flags or environment):
/// --region, AWS_REGION
/// --asg-name, ASG_NAME => switch an Auto Scaling Group
/// --instance-id, INSTANCE_ID => switch a single instance
#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    log_subscriber(filter, std::io::stdout).init();

    let config = match Opt::from_iter_safe(std::env::args_os()).map(Opt::into_config) {
        Ok(Ok(config)) => config,
        Ok(Err(err)) => {
            error!("invalid configuration: {}", err);
            process::exit(1)
        }
        Err(err) => {
            error!("{}", err.message);
            process::exit(1)
        }
    };
    info!(?config, "configuration loaded");

    lambda_runtime::run(service_fn(|event: LambdaEvent<LambdaFunctionUrlRequest>| handle_request(&config, event))).await
}

/// Plain lines for CloudWatch, which adds its own timestamps and shows escape codes verbatim.
fn log_subscriber<W>(filter: EnvFilter, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .with_writer(writer)
        .finish()
}

/// Only the raw path is consumed. A missing path routes like an unknown one.
fn request_path(request: LambdaFunctionUrlRequest) -> String {
    request.raw_path.unwrap_or_default()
}

/// Fresh clients for every invocation, nothing is shared between requests.
fn build_controller(config: &ControllerConfig) -> Box<dyn PowerController> {
    match &config.target {
        Target::AutoScalingGroup(name) => Box::new(AutoScalingGroupController::new(AsgOps::new(&config.region), name)),
        Target::Instance(id) => Box::new(InstanceController::new(Ec2Ops::new(&config.region), id)),
    }
}

async fn handle_request(config: &ControllerConfig, event: LambdaEvent<LambdaFunctionUrlRequest>) -> Result<ResponseEnvelope, ControllerError> {
    let path = request_path(event.payload);
    info!(path = %path, request_id = %event.context.request_id, "invoked");
    let controller = build_controller(config);
    match router::dispatch(controller.as_ref(), &path).await {
        Ok(envelope) => {
            info!(status = envelope.status_code, "responded");
            Ok(envelope)
        }
        Err(err) => {
            error!(path = %path, "{}", err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_lines_carry_no_escape_codes() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = log_subscriber(EnvFilter::new("info"), move || writer.clone());
        tracing::subscriber::with_default(subscriber, || {
            error!(path = "/on", "SetDesiredCapacity failed: throttled");
        });
        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("SetDesiredCapacity failed: throttled"));
        assert!(!output.contains('\u{1b}'));
    }

    fn function_url_event(raw_path: Option<&str>) -> String {
        let raw_path = match raw_path {
            Some(path) => format!(r#""rawPath": "{}","#, path),
            None => String::new(),
        };
        format!(
            r#"{{
                "version": "2.0",
                "routeKey": "$default",
                {}
                "rawQueryString": "",
                "headers": {{ "host": "abcdefg.lambda-url.eu-west-2.on.aws", "user-agent": "curl/8.4.0" }},
                "queryStringParameters": {{}},
                "requestContext": {{
                    "accountId": "anonymous",
                    "apiId": "abcdefg",
                    "domainName": "abcdefg.lambda-url.eu-west-2.on.aws",
                    "domainPrefix": "abcdefg",
                    "http": {{
                        "method": "GET",
                        "path": "/status",
                        "protocol": "HTTP/1.1",
                        "sourceIp": "203.0.113.7",
                        "userAgent": "curl/8.4.0"
                    }},
                    "requestId": "6f4c2a9e-1b7d-4e0a-9c1e-2f3a4b5c6d7e",
                    "routeKey": "$default",
                    "stage": "$default",
                    "time": "01/Mar/2024:09:30:00 +0000",
                    "timeEpoch": 1709285400000
                }},
                "isBase64Encoded": false
            }}"#,
            raw_path
        )
    }

    #[test]
    fn decodes_function_url_event() {
        let request: LambdaFunctionUrlRequest = serde_json::from_str(&function_url_event(Some("/status"))).unwrap();
        assert_eq!(request_path(request), "/status");
    }

    #[test]
    fn missing_raw_path_is_empty() {
        let request: LambdaFunctionUrlRequest = serde_json::from_str(&function_url_event(None)).unwrap();
        assert_eq!(request_path(request), "");
    }
}
