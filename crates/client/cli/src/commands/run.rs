//! Run a scripted scenario end to end.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use runtime::{ManualClock, Runtime, RuntimeConfig, Scenario, SharedVerifier};
use zk::{AttestationKey, AttestationProver, Prover};

use crate::logging;

/// Run a RON scenario and print its report as JSON
#[derive(Parser)]
pub struct RunScenario {
    /// Scenario file (RON)
    #[arg(value_name = "FILE")]
    scenario: PathBuf,

    /// Proving backend for proven claims
    #[arg(short, long, value_enum, default_value_t = Backend::Attestation)]
    backend: Backend,

    /// Secret the attestation key is derived from
    #[arg(short, long, env = "SIM_KEY_SECRET", default_value = "dungeon-sim")]
    secret: String,

    /// Config positions per slot in the Groth16 circuit
    #[arg(long, default_value_t = 8)]
    max_configs: usize,

    /// Session ID for persisted logs (defaults to GAME_SESSION_ID, then the scenario name)
    #[arg(long, value_name = "SESSION")]
    session: Option<String>,

    /// Also write logs to the session directory
    #[arg(long)]
    log_file: bool,

    /// Pretty-print the JSON report
    #[arg(short, long)]
    pretty: bool,
}

impl RunScenario {
    pub async fn execute(self) -> Result<()> {
        let scenario = Scenario::load(&self.scenario)
            .with_context(|| format!("failed to load {}", self.scenario.display()))?;

        let mut config = RuntimeConfig::from_env();
        if let Some(session) = self.session {
            config.session_id = Some(session);
        } else if config.session_id.is_none() {
            config.session_id = Some(session_id_from(&scenario.name));
        }

        let log_dir = self.log_file.then(|| config.session_dir());
        let _guard = logging::setup_logging(log_dir.as_deref())?;

        tracing::info!(
            scenario = %scenario.name,
            steps = scenario.steps.len(),
            backend = ?self.backend,
            persistence = config.enable_persistence,
            "starting scenario"
        );
        let (prover, verifier) =
            proving_backend(self.backend, &self.secret, self.max_configs, &scenario)?;

        let clock = ManualClock::default();
        let runtime = Runtime::builder()
            .config(config)
            .session(scenario.session.clone())
            .seekers(scenario.registry.clone())
            .clock(clock.clone())
            .verifier(verifier)
            .build()
            .await
            .context("failed to start runtime")?;

        let report = scenario.run(&runtime.handle(), &clock, prover.as_ref()).await;
        runtime.shutdown().await?;
        let report = report.context("scenario aborted")?;

        tracing::info!(
            rejected = report.rejected(),
            phase = %report.phase,
            "scenario finished"
        );
        let json = if self.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{json}");
        Ok(())
    }
}

#[cfg_attr(not(feature = "arkworks"), allow(unused_variables))]
fn proving_backend(
    backend: Backend,
    secret: &str,
    max_configs: usize,
    scenario: &Scenario,
) -> Result<(Box<dyn Prover>, SharedVerifier)> {
    match backend {
        Backend::Attestation => {
            let key = AttestationKey::from_secret(secret.as_bytes());
            tracing::info!(key = %key.fingerprint(), "attestation key derived");
            let prover = AttestationProver::new(key);
            let verifier: SharedVerifier = Arc::new(prover.verifier());
            Ok((Box::new(prover), verifier))
        }
        #[cfg(feature = "arkworks")]
        Backend::Groth16 => {
            let shape = zk::CircuitShape::new(scenario.session.max_slots, max_configs);
            let prover = zk::Groth16Prover::setup(shape, &mut rand::rngs::OsRng)
                .context("groth16 setup failed")?;
            let verifier: SharedVerifier = Arc::new(prover.verifier());
            Ok((Box::new(prover), verifier))
        }
    }
}

/// Which backend proves claims.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Keyed tag from a trusted prover (development only)
    Attestation,
    /// Groth16 circuit proof, harvest sessions only
    #[cfg(feature = "arkworks")]
    Groth16,
}

/// Scenario names may contain anything; session directories may not.
fn session_id_from(name: &str) -> String {
    let id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if id.is_empty() {
        RuntimeConfig::DEFAULT_SESSION_ID.to_string()
    } else {
        id
    }
}
