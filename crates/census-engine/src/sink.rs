//! Metrics sink: one write per species and one per material per fold.
//!
//! Points are shipped as InfluxDB v2 line protocol over HTTP. Delivery is
//! best-effort relative to the in-memory store: the fold has already
//! happened when the sink runs, and a sink outage never rolls it back.
//! When Influx is disabled the log sink records the same points at debug
//! level, which keeps the write path exercised in development.
//!
//! Uses enum dispatch instead of trait objects because async methods are
//! not dyn-compatible in Rust.

use census_types::{RunIdentity, Scene};
use tracing::debug;

use crate::config::InfluxConfig;

/// Errors that can occur while shipping metric points.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The HTTP request itself failed.
    #[error("metrics write failed: {source}")]
    Http {
        /// The underlying HTTP client error.
        #[from]
        source: reqwest::Error,
    },

    /// The metrics endpoint answered with a non-success status.
    #[error("metrics endpoint rejected write: {status}: {body}")]
    Rejected {
        /// HTTP status code returned.
        status: u16,
        /// Response body, for the log line.
        body: String,
    },
}

/// A destination for per-fold metric points.
pub enum MetricsSink {
    /// Ship line protocol to an InfluxDB v2 instance.
    Influx(InfluxSink),
    /// Log the points instead of shipping them.
    Log(LogSink),
}

impl MetricsSink {
    /// Build the sink selected by the configuration.
    pub fn from_config(config: &InfluxConfig) -> Self {
        if config.enabled {
            Self::Influx(InfluxSink::new(config))
        } else {
            Self::Log(LogSink)
        }
    }

    /// Record one folded scene's points.
    ///
    /// Dispatches to the concrete sink implementation.
    pub async fn record_scene(
        &self,
        identity: &RunIdentity,
        scene: &Scene,
    ) -> Result<(), SinkError> {
        match self {
            Self::Influx(sink) => sink.record_scene(identity, scene).await,
            Self::Log(sink) => {
                sink.record_scene(identity, scene);
                Ok(())
            }
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Influx(_) => "influx",
            Self::Log(_) => "log",
        }
    }
}

/// Sink that ships line protocol to InfluxDB v2 (`/api/v2/write`).
pub struct InfluxSink {
    client: reqwest::Client,
    url: String,
    token: String,
    org: String,
    bucket: String,
}

impl InfluxSink {
    /// Create a sink for the configured instance.
    pub fn new(config: &InfluxConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            token: config.token.clone(),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
        }
    }

    /// Ship one scene's points in a single write request.
    async fn record_scene(&self, identity: &RunIdentity, scene: &Scene) -> Result<(), SinkError> {
        let body = line_protocol(identity, scene);
        if body.is_empty() {
            return Ok(());
        }

        let response = self.write_request(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            species = scene.species.len(),
            materials = scene.pellets.len(),
            "metric points shipped"
        );
        Ok(())
    }

    /// Build the write request. Org and bucket go through the query
    /// builder so names containing reserved characters are escaped.
    fn write_request(&self, body: String) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/api/v2/write", self.url))
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "s"),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
    }
}

/// Sink that records points in the log instead of shipping them.
pub struct LogSink;

impl LogSink {
    /// Log one scene's points at debug level.
    fn record_scene(&self, identity: &RunIdentity, scene: &Scene) {
        for line in line_protocol(identity, scene).lines() {
            debug!(target: "census_metrics", point = line, "metric point");
        }
    }
}

/// Render one scene as InfluxDB line protocol.
///
/// One `census` point per species (count, total energy, per-gene stats)
/// and one `pellets` point per material (count, energy). No explicit
/// timestamp: the simulated-time axis lives in the store; wall-clock
/// arrival time is what the metrics database keys on.
pub fn line_protocol(identity: &RunIdentity, scene: &Scene) -> String {
    let mut lines = Vec::new();
    let scenario = escape_tag(&identity.scenario);
    let run = escape_tag(&identity.run_number);

    for (name, stat) in &scene.species {
        let mut fields = vec![
            format!("count={}i", stat.count),
            format!("totalEnergy={}", stat.total_energy),
        ];
        for (gene, stats) in &stat.gene_stats {
            let key = escape_tag(gene);
            fields.push(format!("{key}_mean={}", stats.mean));
            fields.push(format!("{key}_median={}", stats.median));
            fields.push(format!("{key}_min={}", stats.min));
            fields.push(format!("{key}_max={}", stats.max));
        }
        lines.push(format!(
            "census,scenario={scenario},run={run},species={} {}",
            escape_tag(name),
            fields.join(",")
        ));
    }

    for (material, stat) in &scene.pellets {
        lines.push(format!(
            "pellets,scenario={scenario},run={run},material={} count={}i,energy={}",
            escape_tag(material),
            stat.count,
            stat.energy
        ));
    }

    lines.join("\n")
}

/// Escape a tag value or field key for line protocol: spaces, commas, and
/// equals signs must be backslash-escaped.
fn escape_tag(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ' ' | ',' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
