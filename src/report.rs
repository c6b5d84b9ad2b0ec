use serde::{de, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::process::ExitCode;

use crate::error::DedupError;

/// Outcome of a run, serialized as its sysexits-style exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    InvalidConfig,
    IoError,
}

impl Status {
    pub fn code(&self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::IoError => 74,
            Status::InvalidConfig => 78,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

struct StatusCodeVisitor;

impl<'de> de::Visitor<'de> for StatusCodeVisitor {
    type Value = Status;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("Status")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        match v {
            0 => Ok(Status::Ok),
            74 => Ok(Status::IoError),
            78 => Ok(Status::InvalidConfig),
            value => Err(de::Error::custom(value.to_string())),
        }
    }
}

impl<'de> de::Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_u8(StatusCodeVisitor)
    }
}

/// What a driver prints to stdout once a pipeline finishes.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub status_code: Status,
    pub pipeline: String,
    pub body: Value,
}

pub fn make_report(pipeline: &str, result: Result<Value, DedupError>) -> ReportPayload {
    match result {
        Err(err) => ReportPayload {
            status_code: err.status,
            pipeline: pipeline.to_string(),
            body: Value::String(err.msg),
        },
        Ok(body) => ReportPayload {
            status_code: Status::Ok,
            pipeline: pipeline.to_string(),
            body,
        },
    }
}

impl ReportPayload {
    /// Prints the report as a single JSON line and returns the process exit code.
    pub fn emit(&self) -> ExitCode {
        match serde_json::to_string(self) {
            Ok(line) => println!("{}", line),
            Err(err) => tracing::error!("unable to serialize run report: {}", err),
        }
        self.status_code.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_run_carries_message_and_code() {
        let report = make_report("lines", Err(DedupError::io_error("disk full")));
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({ "statusCode": 74, "pipeline": "lines", "body": "disk full" })
        );
    }

    #[test]
    fn report_parses_back_for_callers() {
        let raw = r#"{"statusCode":0,"pipeline":"minhash","body":{"clusters":2}}"#;
        let report: ReportPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(report.status_code, Status::Ok);
        assert_eq!(report.body["clusters"], 2);
    }

    #[test]
    fn unknown_status_code_is_rejected() {
        let raw = r#"{"statusCode":500,"pipeline":"minhash","body":null}"#;
        assert!(serde_json::from_str::<ReportPayload>(raw).is_err());
    }
}
