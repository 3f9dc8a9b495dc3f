//! The end-to-end counter scenario: every operation of the program exercised
//! in order across the base chain and the ephemeral rollup, with the record
//! state verified at each deterministic checkpoint.

use app_core::config::Config;
use app_core::types::HarnessResult;
use std::time::{Duration, Instant};

use instruction::Instruction as SolanaInstruction;
use keypair::Keypair;
use protocol::{requests::CounterProgram, DELEGATION_PROGRAM_ID};
use pubkey::Pubkey;
use signer::Signer;

use crate::{client::LayerClient, identity};

/// Grace period for state to propagate between layers (airdrops landing,
/// undelegation settling back on the base chain).
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);
const SETTLE_POLL: Duration = Duration::from_millis(500);

/// Which execution layer a request is sent to.
#[derive(Debug, Clone, Copy)]
pub enum Layer {
    Chain,
    Ephem,
}

/// # Flow
///
/// Owns one client per layer, the signing identity, and the request builder,
/// and drives the counter program through its operations.
pub struct Flow {
    chain: LayerClient,
    ephem: LayerClient,
    payer: Keypair,
    program: CounterProgram,
    counter_pda: Pubkey,
    config: Config,
}

impl Flow {
    pub async fn new(config: Config) -> HarnessResult<Self> {
        let payer = identity::load_or_create(&config.identity.keypair_path)?;
        let ty = config.connection.http_connection_type;
        let chain = LayerClient::new("chain", &config.connection.chain_url, ty, &config).await?;
        let ephem = LayerClient::new("ephemeral", &config.connection.ephem_url, ty, &config).await?;
        let program = CounterProgram::new(config.program.id);
        let counter_pda = program.counter_pda(&payer.pubkey());
        tracing::info!(
            payer = %payer.pubkey(),
            counter = %counter_pda,
            program = %program.id(),
            "harness ready"
        );
        Ok(Self {
            chain,
            ephem,
            payer,
            program,
            counter_pda,
            config,
        })
    }

    /// # Run Flow
    ///
    /// Exercises the full instruction set end to end. Each step is submitted,
    /// confirmed, and verified before the next one starts; the first failure
    /// aborts the run.
    pub async fn run(&mut self) -> HarnessResult<()> {
        self.ensure_funded().await?;
        let payer = self.payer.pubkey();

        // create the record unless this identity already ran before
        if self.chain.counter(&self.counter_pda).await?.is_none() {
            self.step("initialize counter", Layer::Chain, self.program.initialize(&payer))
                .await?;
        }
        let start = self
            .chain
            .counter(&self.counter_pda)
            .await?
            .ok_or("counter record not found after initialization")?;

        self.step("increase counter on chain", Layer::Chain, self.program.increase(&payer, 1))
            .await?;
        self.assert_count(Layer::Chain, start + 1).await?;

        // hand the record over to the rollup, unless a previous run left it there
        if self.chain.owner(&self.counter_pda).await? != Some(DELEGATION_PROGRAM_ID) {
            self.step("delegate counter", Layer::Chain, self.program.delegate(&payer))
                .await?;
        }

        self.step("increase counter on rollup", Layer::Ephem, self.program.increase(&payer, 1))
            .await?;
        self.assert_count(Layer::Ephem, start + 2).await?;
        self.step("commit counter state", Layer::Ephem, self.program.commit(&payer))
            .await?;

        self.step("increase counter on rollup", Layer::Ephem, self.program.increase(&payer, 1))
            .await?;
        self.step(
            "commit and undelegate",
            Layer::Ephem,
            self.program.commit_and_undelegate(&payer),
        )
        .await?;
        self.settle(start + 3).await?;

        tracing::info!(count = start + 3, "flow complete, counter is back on the base layer");
        Ok(())
    }

    pub async fn initialize(&mut self) -> HarnessResult<()> {
        let payer = self.payer.pubkey();
        self.step("initialize counter", Layer::Chain, self.program.initialize(&payer))
            .await
    }

    pub async fn increase(&mut self, layer: Layer, amount: u64) -> HarnessResult<()> {
        let payer = self.payer.pubkey();
        self.step("increase counter", layer, self.program.increase(&payer, amount))
            .await
    }

    pub async fn delegate(&mut self) -> HarnessResult<()> {
        let payer = self.payer.pubkey();
        self.step("delegate counter", Layer::Chain, self.program.delegate(&payer))
            .await
    }

    pub async fn commit(&mut self) -> HarnessResult<()> {
        let payer = self.payer.pubkey();
        self.step("commit counter state", Layer::Ephem, self.program.commit(&payer))
            .await
    }

    pub async fn undelegate(&mut self) -> HarnessResult<()> {
        let payer = self.payer.pubkey();
        self.step(
            "commit and undelegate",
            Layer::Ephem,
            self.program.commit_and_undelegate(&payer),
        )
        .await
    }

    /// Reports the record's state on both layers.
    pub async fn status(&mut self) -> HarnessResult<()> {
        let payer = self.payer.pubkey();
        let balance = self.chain.balance(&payer).await?;
        let owner = self.chain.owner(&self.counter_pda).await?;
        let chain_count = self.chain.counter(&self.counter_pda).await?;
        let ephem_count = self.ephem.counter(&self.counter_pda).await?;
        tracing::info!(
            %payer,
            balance,
            counter = %self.counter_pda,
            delegated = (owner == Some(DELEGATION_PROGRAM_ID)),
            chain = ?chain_count,
            ephemeral = ?ephem_count,
            "counter status"
        );
        Ok(())
    }

    /// Airdrops to the payer when its balance falls below the configured
    /// minimum. Only attempted on development clusters.
    async fn ensure_funded(&mut self) -> HarnessResult<()> {
        if !self.config.connection.chain_url.is_dev_cluster() {
            return Ok(());
        }
        let funding = self.config.funding;
        let payer = self.payer.pubkey();
        let balance = self.chain.balance(&payer).await?;
        if balance >= funding.min_balance_lamports {
            return Ok(());
        }
        tracing::info!(balance, lamports = funding.airdrop_lamports, "airdropping to payer");
        self.chain.airdrop(&payer, funding.airdrop_lamports).await?;
        let deadline = Instant::now() + SETTLE_TIMEOUT;
        while self.chain.balance(&payer).await? < funding.min_balance_lamports {
            if Instant::now() >= deadline {
                return Err("airdrop was not credited in time".into());
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
        Ok(())
    }

    async fn step(
        &mut self,
        name: &'static str,
        layer: Layer,
        request: SolanaInstruction,
    ) -> HarnessResult<()> {
        let started = Instant::now();
        let Self {
            chain,
            ephem,
            payer,
            ..
        } = self;
        let client = match layer {
            Layer::Chain => chain,
            Layer::Ephem => ephem,
        };
        let signature = client.execute(request, payer).await?;
        tracing::info!(
            %signature,
            layer = client.name(),
            elapsed = ?started.elapsed(),
            "{name}"
        );
        Ok(())
    }

    async fn assert_count(&mut self, layer: Layer, expected: u64) -> HarnessResult<()> {
        let Self {
            chain,
            ephem,
            counter_pda,
            ..
        } = self;
        let client = match layer {
            Layer::Chain => chain,
            Layer::Ephem => ephem,
        };
        let count = client
            .counter(counter_pda)
            .await?
            .ok_or("counter record not found")?;
        if count != expected {
            let name = client.name();
            return Err(format!("{name} counter is at {count}, expected {expected}").into());
        }
        Ok(())
    }

    /// Waits for the undelegation to settle: ownership back with the program
    /// and the committed count visible on the base chain.
    async fn settle(&mut self, expected: u64) -> HarnessResult<()> {
        let deadline = Instant::now() + SETTLE_TIMEOUT;
        loop {
            let owner = self.chain.owner(&self.counter_pda).await?;
            let count = self.chain.counter(&self.counter_pda).await?;
            if owner == Some(self.program.id()) && count == Some(expected) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(format!(
                    "undelegation did not settle on the base layer: owner {owner:?}, count {count:?}"
                )
                .into());
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }
}
