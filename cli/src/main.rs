//! idv-inspect: look inside a serialized user session and apply step
//! invalidations by hand.
//!
//! Session files hold a JSON-encoded `UserSession` (`{"id": ..., "data": {...}}`).
//! PII-bearing attributes are always printed redacted.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use idv_session::tracing_spans::idv_step_span;
use idv_session::{IdvConfig, IdvSession, InvalidationOutcome, StepInvalidator, UserSession};
use idv_store::PhoneNormalizer;
use idv_utils::LogFormat;
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "idv-inspect", about = "Inspect and repair serialized IdV sessions")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "IDV_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's value.
    #[arg(long, env = "IDV_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "IDV_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the phase, predicates and set attributes of a session.
    Inspect {
        /// Session file, or "-" for stdin.
        session: PathBuf,
    },
    /// Clear the results of steps after the given one.
    Invalidate {
        /// Session file, or "-" for stdin.
        session: PathBuf,
        #[arg(long, value_enum)]
        step: Step,
        /// Write the updated session back to the file instead of stdout.
        #[arg(long)]
        write: bool,
    },
    /// Normalize a phone number to E.164 the way the phone step does.
    NormalizePhone { raw: String },
    /// Print the default configuration as TOML.
    DefaultConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum Step {
    /// Applicant, resolution and phone confirmation.
    AfterSsn,
    /// Resolution result only.
    VerifyInfo,
    /// Mechanism back to phone, plus phone confirmation.
    AfterVerifyInfo,
    /// Phone confirmation only.
    Phone,
    /// Applicant only.
    Applicant,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let path = path.to_str().context("config path is not valid UTF-8")?;
            IdvConfig::from_toml_file(path)?
        }
        None => IdvConfig::default(),
    };
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    idv_utils::init_logging(cli.log_format.unwrap_or(config.log_format), level);

    match cli.command {
        Command::Inspect { session } => {
            let user_session = read_session(&session)?;
            let idv = IdvSession::load(&user_session, &config);
            println!("{}", serde_json::to_string_pretty(&summary(&idv))?);
        }
        Command::Invalidate {
            session,
            step,
            write,
        } => {
            let mut user_session = read_session(&session)?;
            apply_invalidation(&mut user_session, &config, step)?;
            let rendered = serde_json::to_string_pretty(&user_session)?;
            if write && session != Path::new("-") {
                std::fs::write(&session, rendered)
                    .with_context(|| format!("writing {}", session.display()))?;
                tracing::info!(path = %session.display(), "session updated");
            } else {
                println!("{rendered}");
            }
        }
        Command::NormalizePhone { raw } => {
            let phone = config.phone_normalizer().parse(&raw)?;
            println!("{phone}");
        }
        Command::DefaultConfig => {
            print!("{}", IdvConfig::default().to_toml_string()?);
        }
    }
    Ok(())
}

fn read_session(path: &Path) -> anyhow::Result<UserSession> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&contents).context("session file is not a serialized UserSession")
}

impl Step {
    fn name(self) -> &'static str {
        match self {
            Self::AfterSsn => "invalidate_after_ssn",
            Self::VerifyInfo => "invalidate_verify_info",
            Self::AfterVerifyInfo => "invalidate_after_verify_info",
            Self::Phone => "invalidate_phone",
            Self::Applicant => "clear_applicant",
        }
    }
}

/// Load, invalidate and store back. `user_session` is untouched on error.
fn apply_invalidation(
    user_session: &mut UserSession,
    config: &IdvConfig,
    step: Step,
) -> anyhow::Result<()> {
    let span = idv_step_span(step.name(), user_session.id());
    let _guard = span.enter();

    let mut idv = IdvSession::load(user_session, config);
    if invalidate(&mut idv, step) == InvalidationOutcome::ProfileLocked {
        anyhow::bail!("session already has a profile; refusing to invalidate");
    }
    idv.store(user_session);
    Ok(())
}

fn invalidate(idv: &mut IdvSession, step: Step) -> InvalidationOutcome {
    let invalidator = StepInvalidator;
    match step {
        Step::AfterSsn => invalidator.invalidate_steps_after_ssn(idv),
        Step::VerifyInfo => invalidator.invalidate_verify_info_step(idv),
        Step::AfterVerifyInfo => invalidator.invalidate_steps_after_verify_info(idv),
        Step::Phone => invalidator.invalidate_phone_step(idv),
        Step::Applicant => invalidator.clear_applicant(idv),
    }
}

fn summary(idv: &IdvSession) -> Value {
    let attributes: serde_json::Map<String, Value> = idv
        .set_attributes()
        .into_iter()
        .map(|(attr, value)| {
            let shown = if attr.is_sensitive() {
                json!("<redacted>")
            } else {
                value
            };
            (attr.name().to_string(), shown)
        })
        .collect();
    let failed_phones = idv.failed_phone_step_numbers().len();

    json!({
        "session": idv.id().as_str(),
        "phase": format!("{:?}", idv.phase(None)),
        "document_capture_complete": idv.document_capture_complete(),
        "verify_info_step_complete": idv.verify_info_step_complete(),
        "address_mechanism_chosen": idv.address_mechanism_chosen(),
        "address_step_complete": idv.address_step_complete(),
        "phone_confirmed": idv.phone_confirmed(),
        "gpo_verification_needed": idv.gpo_verification_needed(),
        "phone_otp_sent": idv.phone_otp_sent(),
        "address_confirmed": idv.address_confirmed(),
        "pii_staged": idv.has_staged_pii(),
        "failed_phone_numbers": failed_phones,
        "attributes": attributes,
    })
}
