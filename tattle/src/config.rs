use clap::{ArgGroup, Parser};
use tattle_notifiers::notifiers::{
    governator::{CancellationRequest, DockerCancellation, GovernatorConfig, ServiceCancellation},
    redis_queue::QueueConfig,
};

use crate::record::{FailureRecord, DEFAULT_INDEX_PREFIX, DEFAULT_RECORD_TYPE};

/// Every flag can also be given through its `TATTLE_*` environment variable.
///
/// Exactly one identifying pair is required: `--application-name`/`--service-name`
/// or `--docker-url`/`--etcd-dir`.
#[derive(Debug, Parser)]
#[command(
    name = "tattle",
    version,
    about = "Report a failed job to a redis queue and ask the governator to cancel it",
    group(ArgGroup::new("target").required(true).args(["application_name", "docker_url"]))
)]
pub struct Cli {
    /// Code that the service failed with
    #[arg(
        short = 'x',
        long,
        env = "TATTLE_EXIT_CODE",
        value_parser = parse_exit_code,
        allow_negative_numbers = true
    )]
    pub exit_code: i32,

    /// Redis server to tattle to
    #[arg(short = 'r', long, env = "TATTLE_REDIS_URI")]
    pub redis_uri: String,

    /// Redis queue to place the tattle in
    #[arg(short = 'q', long, env = "TATTLE_REDIS_QUEUE")]
    pub redis_queue: String,

    /// Uri to POST to with a cancellation notice
    #[arg(short = 'u', long, env = "TATTLE_URI")]
    pub uri: String,

    /// Prefix of the date partitioned index the record is filed under
    #[arg(long, env = "TATTLE_INDEX_PREFIX", default_value = DEFAULT_INDEX_PREFIX)]
    pub index_prefix: String,

    /// How long the job ran before failing, if known
    #[arg(long, env = "TATTLE_ELAPSED_TIME", default_value_t = 0)]
    pub elapsed_time: i64,

    /// Name of the failing application
    #[arg(short = 'a', long, env = "TATTLE_APPLICATION_NAME", requires = "service_name")]
    pub application_name: Option<String>,

    /// Name of the service at fault
    #[arg(short = 's', long, env = "TATTLE_SERVICE_NAME", requires = "application_name")]
    pub service_name: Option<String>,

    /// Docker URL of the service
    #[arg(short = 'd', long, env = "TATTLE_DOCKER_URL", requires = "etcd_dir")]
    pub docker_url: Option<String>,

    /// Etcd dir of the service
    #[arg(short = 'e', long, env = "TATTLE_ETCD_DIR", requires = "docker_url")]
    pub etcd_dir: Option<String>,
}

/// What failed, which decides the identifying fields sent along.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An application/service pair
    Service {
        application_name: String,
        service_name: String,
    },
    /// A docker image scheduled through etcd
    Docker { docker_url: String, etcd_dir: String },
}

impl Target {
    /// The `(job, worker)` pair recorded for this target.
    fn identity(&self) -> (&str, &str) {
        match self {
            Target::Service {
                application_name,
                service_name,
            } => (application_name.as_str(), service_name.as_str()),
            Target::Docker {
                docker_url,
                etcd_dir,
            } => (docker_url.as_str(), etcd_dir.as_str()),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExitCodeError {
    #[error("'{0}' is not an integer exit code")]
    NotANumber(String),
    #[error("exit code 0 is a success, there is nothing to tattle on")]
    Zero,
}

fn parse_exit_code(value: &str) -> Result<i32, ExitCodeError> {
    match value.trim().parse::<i32>() {
        Ok(0) => Err(ExitCodeError::Zero),
        Ok(code) => Ok(code),
        Err(_) => Err(ExitCodeError::NotANumber(value.to_string())),
    }
}

/// Everything a single tattle needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub exit_code: i32,
    pub index_prefix: String,
    pub elapsed_time: i64,
    pub target: Target,
    pub queue: QueueConfig,
    pub governator: GovernatorConfig,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "either --application-name and --service-name or --docker-url and --etcd-dir are required"
    )]
    MissingTarget,
}

impl TryFrom<Cli> for Config {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let target = match (
            cli.application_name,
            cli.service_name,
            cli.docker_url,
            cli.etcd_dir,
        ) {
            (Some(application_name), Some(service_name), None, None) => Target::Service {
                application_name,
                service_name,
            },
            (None, None, Some(docker_url), Some(etcd_dir)) => Target::Docker {
                docker_url,
                etcd_dir,
            },
            _ => return Err(ConfigError::MissingTarget),
        };

        Ok(Self {
            exit_code: cli.exit_code,
            index_prefix: cli.index_prefix,
            elapsed_time: cli.elapsed_time,
            target,
            queue: QueueConfig {
                uri: cli.redis_uri,
                queue: cli.redis_queue,
            },
            governator: GovernatorConfig { uri: cli.uri },
        })
    }
}

impl Config {
    pub fn record(&self) -> FailureRecord {
        let (job_type, worker_name) = self.target.identity();

        FailureRecord::new(
            &self.index_prefix,
            DEFAULT_RECORD_TYPE,
            job_type,
            worker_name,
            self.exit_code,
            self.elapsed_time,
        )
    }

    pub fn cancellation(&self) -> CancellationRequest {
        match &self.target {
            Target::Service {
                application_name,
                service_name,
            } => ServiceCancellation {
                application_name: application_name.clone(),
                exit_code: Some(self.exit_code),
                service_name: service_name.clone(),
            }
            .into(),
            Target::Docker {
                docker_url,
                etcd_dir,
            } => DockerCancellation {
                docker_url: docker_url.clone(),
                exit_code: self.exit_code,
                etcd_dir: etcd_dir.clone(),
            }
            .into(),
        }
    }
}
