use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INDEX_PREFIX: &str = "metric:tattle";
pub const DEFAULT_RECORD_TYPE: &str = "tattle";

/// Exit codes at or above this are counted as unsuccessful.
const FAILURE_THRESHOLD: i32 = 500;

/// A single failure event, shaped for the log indexer that drains the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub index: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub elapsed_time: i64,
    pub request: Request,
    pub response: Response,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub metadata: RequestMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub job_type: String,
    pub worker_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub success: bool,
    pub code: i32,
}

impl FailureRecord {
    /// Builds a record indexed under today's local date.
    pub fn new(
        index_prefix: &str,
        record_type: &str,
        job_type: &str,
        worker_name: &str,
        code: i32,
        elapsed_time: i64,
    ) -> Self {
        let today = Local::now().date_naive();
        Self::on(today, index_prefix, record_type, job_type, worker_name, code, elapsed_time)
    }

    fn on(
        date: NaiveDate,
        index_prefix: &str,
        record_type: &str,
        job_type: &str,
        worker_name: &str,
        code: i32,
        elapsed_time: i64,
    ) -> Self {
        Self {
            index: index_for(index_prefix, date),
            record_type: record_type.to_string(),
            body: Body {
                elapsed_time,
                request: Request {
                    metadata: RequestMetadata {
                        job_type: job_type.to_string(),
                        worker_name: worker_name.to_string(),
                    },
                },
                response: Response {
                    metadata: ResponseMetadata {
                        success: is_success(code),
                        code,
                    },
                },
            },
        }
    }
}

/// `<prefix>-YYYY-MM-DD`
pub fn index_for(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}", date.format("%Y-%m-%d"))
}

pub fn is_success(code: i32) -> bool {
    code < FAILURE_THRESHOLD
}
