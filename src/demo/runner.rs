//! Runs the service lifecycle as a sequence of watched submissions.
//!
//! Each step waits for its own milestone before the next one is built, so ids
//! read from the counters always refer to objects that already exist. The
//! first failing step ends the run.

use serde::Serialize;
use subxt::tx::DynamicPayload;
use subxt_signer::{ecdsa, sr25519::Keypair};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::chain::calls::{self, Field, ServiceBlueprint};
use crate::chain::keyring::{
    account_id, address_of, ecdsa_keypair_from_suri, ecdsa_public_key, keypair_from_suri,
};
use crate::chain::types::{ChainError, ChainResult};
use crate::demo::counters::{Counter, ServiceCounters};
use crate::watcher::{InclusionReport, LedgerConnection, TxWatcher, WatchError};

/// Requested instance lifetime, in blocks.
pub const REQUEST_TTL: u64 = 10_000;
/// Threshold passed to the `keygen` job.
pub const KEYGEN_THRESHOLD: u8 = 2;
/// Message passed to the `sign` job.
pub const SIGN_MESSAGE: &[u8] = &[0x0f, 0x00, 0xdc, 0x00, 0xed];

const KEYGEN_JOB: u8 = 0;
const SIGN_JOB: u8 = 1;

#[derive(Debug, Clone, Default)]
pub struct DemoOptions {
    /// Wait for finalization of every step instead of block inclusion.
    pub wait_until_finalized: bool,
    /// Wait for Enter on stdin before each step.
    pub pause: bool,
}

/// Outcome of one successful step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    /// SS58 address of the signer.
    pub signer: String,
    pub report: InclusionReport,
}

#[derive(Debug, Error)]
pub enum DemoError {
    /// A submission did not reach its milestone.
    #[error("{step} failed: {source}")]
    Step {
        step: String,
        #[source]
        source: WatchError,
    },

    /// Keys could not be derived or a counter could not be read.
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Development accounts taking part in the walkthrough.
struct Participants {
    alice: Keypair,
    bob: Keypair,
    charlie: Keypair,
    dave: Keypair,
    eve: Keypair,
    /// Operator ecdsa keys for Bob, Charlie and Dave.
    operator_keys: [[u8; 33]; 3],
    /// Key the operators jointly hold after `keygen`.
    dkg: ecdsa::Keypair,
}

impl Participants {
    fn dev() -> ChainResult<Self> {
        Ok(Self {
            alice: keypair_from_suri("//Alice")?,
            bob: keypair_from_suri("//Bob")?,
            charlie: keypair_from_suri("//Charlie")?,
            dave: keypair_from_suri("//Dave")?,
            eve: keypair_from_suri("//Eve")?,
            operator_keys: [
                ecdsa_public_key(&ecdsa_keypair_from_suri("//Bob")?),
                ecdsa_public_key(&ecdsa_keypair_from_suri("//Charlie")?),
                ecdsa_public_key(&ecdsa_keypair_from_suri("//Dave")?),
            ],
            dkg: ecdsa_keypair_from_suri("//DKG")?,
        })
    }
}

/// Publish a blueprint, register three operators, request an instance, and
/// run its `keygen` and `sign` jobs.
pub async fn run_service_demo<C, N>(
    watcher: &TxWatcher<C>,
    counters: &N,
    options: &DemoOptions,
) -> Result<Vec<StepReport>, DemoError>
where
    C: LedgerConnection<Signer = Keypair, Transaction = DynamicPayload>,
    N: ServiceCounters + ?Sized,
{
    let who = Participants::dev()?;
    let mut run = Run {
        watcher,
        options,
        reports: Vec::new(),
    };

    let blueprint_id = counters.next_id(Counter::Blueprint).await?;
    let blueprint = ServiceBlueprint::threshold_signatures("Alice");
    run.step(
        "Alice creates the service blueprint",
        &who.alice,
        calls::create_blueprint(&blueprint),
    )
    .await?;
    tracing::info!(blueprint_id, "Blueprint created");

    let operators = [
        ("Bob", &who.bob, &who.operator_keys[0]),
        ("Charlie", &who.charlie, &who.operator_keys[1]),
        ("Dave", &who.dave, &who.operator_keys[2]),
    ];
    for (name, pair, key) in operators {
        run.step(
            &format!("{} registers as operator", name),
            pair,
            calls::register(blueprint_id, key),
        )
        .await?;
    }

    let instance_id = counters.next_id(Counter::Instance).await?;
    let operator_accounts = [
        account_id(&who.bob),
        account_id(&who.charlie),
        account_id(&who.dave),
    ];
    run.step(
        "Eve requests the service",
        &who.eve,
        calls::request(blueprint_id, &operator_accounts, REQUEST_TTL),
    )
    .await?;
    tracing::info!(instance_id, "Service requested");

    let keygen_call = counters.next_id(Counter::JobCall).await?;
    run.step(
        "Eve calls the keygen job",
        &who.eve,
        calls::job_call(instance_id, KEYGEN_JOB, &[Field::Uint8(KEYGEN_THRESHOLD)]),
    )
    .await?;
    run.step(
        "Operators submit the keygen result",
        &who.bob,
        calls::job_submit(
            instance_id,
            keygen_call,
            &[Field::Bytes(ecdsa_public_key(&who.dkg).to_vec())],
        ),
    )
    .await?;

    let sign_call = counters.next_id(Counter::JobCall).await?;
    run.step(
        "Eve calls the sign job",
        &who.eve,
        calls::job_call(instance_id, SIGN_JOB, &[Field::Bytes(SIGN_MESSAGE.to_vec())]),
    )
    .await?;
    let signature = who.dkg.sign(SIGN_MESSAGE);
    run.step(
        "Operators submit the signature",
        &who.bob,
        calls::job_submit(instance_id, sign_call, &[Field::Bytes(signature.0.to_vec())]),
    )
    .await?;

    Ok(run.reports)
}

struct Run<'a, C: LedgerConnection> {
    watcher: &'a TxWatcher<C>,
    options: &'a DemoOptions,
    reports: Vec<StepReport>,
}

impl<C> Run<'_, C>
where
    C: LedgerConnection<Signer = Keypair, Transaction = DynamicPayload>,
{
    async fn step(&mut self, step: &str, signer: &Keypair, call: DynamicPayload) -> Result<(), DemoError> {
        if self.options.pause {
            wait_for_enter(step).await?;
        }

        let signer_address = address_of(signer);
        tracing::info!(step, signer = %signer_address, call = call.call_name(), "Demo step");

        let report = self
            .watcher
            .submit_and_watch(signer, &call, self.options.wait_until_finalized)
            .await
            .map_err(|source| DemoError::Step {
                step: step.to_string(),
                source,
            })?;

        self.reports.push(StepReport {
            step: step.to_string(),
            signer: signer_address,
            report,
        });
        Ok(())
    }
}

async fn wait_for_enter(step: &str) -> std::io::Result<()> {
    let mut out = tokio::io::stdout();
    out.write_all(format!("=> {}\n|- Press Enter to continue\n", step).as_bytes())
        .await?;
    out.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(())
}
