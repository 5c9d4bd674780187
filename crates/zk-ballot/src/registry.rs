//! The voting registry: proposal lifecycle, nullifier bookkeeping and
//! tallying
//!
//! All mutable shared state lives in one `VotingRegistry` instance;
//! the surrounding host serializes calls, so each operation is atomic
//! with respect to every other. Every `vote` gates its mutation on a
//! single oracle call, and any failure leaves no partial state.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use ark_bn254::Fr;
use tracing::info;

use crate::circuit::PUBLIC_INPUT_COUNT;
use crate::error::RegistryError;
use crate::member::VoteChoice;
use crate::proof::Proof;
use crate::verifier::ProofOracle;

/// Source of the ledger's current time, in unix seconds
pub trait Clock {
    fn now(&self) -> u64;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Settable clock for tests and simulations
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::Relaxed);
    }

    pub fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle state of a proposal at a given time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalStatus {
    /// `now <= deadline`: accepting votes
    Open,
    /// `now > deadline`: executable
    Closed,
    /// Terminal, one-way
    Executed,
}

/// A proposal and its tallies; never deleted once created
#[derive(Clone, Debug)]
pub struct Proposal {
    pub id: u64,
    pub description: String,
    pub deadline: u64,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub abstain_votes: u64,
    pub executed: bool,
    nullifiers: HashSet<Fr>,
}

impl Proposal {
    fn new(id: u64, description: String, deadline: u64) -> Self {
        Self {
            id,
            description,
            deadline,
            yes_votes: 0,
            no_votes: 0,
            abstain_votes: 0,
            executed: false,
            nullifiers: HashSet::new(),
        }
    }

    /// Lifecycle state at `now`
    pub fn status(&self, now: u64) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if now > self.deadline {
            ProposalStatus::Closed
        } else {
            ProposalStatus::Open
        }
    }

    /// Whether a nullifier hash has been consumed on this proposal
    pub fn nullifier_used(&self, nullifier_hash: &Fr) -> bool {
        self.nullifiers.contains(nullifier_hash)
    }
}

/// Events emitted on every successful state transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    ProposalCreated {
        id: u64,
        deadline: u64,
    },
    VoteCast {
        proposal_id: u64,
        nullifier_hash: Fr,
        choice: VoteChoice,
    },
    ProposalExecuted {
        id: u64,
    },
}

/// The ledger. Holds the fixed membership root, the proposal store
/// and the event log; the proof oracle and clock are injected.
pub struct VotingRegistry<O, C = SystemClock> {
    root: Fr,
    oracle: O,
    clock: C,
    proposals: HashMap<u64, Proposal>,
    next_id: u64,
    events: Vec<RegistryEvent>,
}

impl<O: ProofOracle> VotingRegistry<O, SystemClock> {
    /// Registry against a fixed membership root, on wall-clock time
    pub fn new(root: Fr, oracle: O) -> Self {
        Self::with_clock(root, oracle, SystemClock)
    }
}

impl<O: ProofOracle, C: Clock> VotingRegistry<O, C> {
    /// Registry with an explicit time source
    pub fn with_clock(root: Fr, oracle: O, clock: C) -> Self {
        Self {
            root,
            oracle,
            clock,
            proposals: HashMap::new(),
            // The circuit rejects a zero proposal id, so ids start at 1
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// The membership root, fixed for this registry's lifetime
    pub fn root(&self) -> Fr {
        self.root
    }

    /// Create a proposal open for `duration_secs` from now.
    /// Always succeeds.
    pub fn create_proposal(&mut self, description: impl Into<String>, duration_secs: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let deadline = self.clock.now().saturating_add(duration_secs);
        self.proposals
            .insert(id, Proposal::new(id, description.into(), deadline));

        info!(id, deadline, "proposal created");
        self.events.push(RegistryEvent::ProposalCreated { id, deadline });
        id
    }

    /// Cast an anonymous vote.
    ///
    /// The four cheap checks run first, in order: unknown proposal,
    /// out-of-range vote value, passed deadline (`now == deadline`
    /// still accepts), reused nullifier. Only then is the oracle
    /// consulted, with public inputs assembled as
    /// `[root, nullifier_hash, proposal_id, vote_value]`. The whole
    /// operation is all-or-nothing.
    pub fn vote(
        &mut self,
        proposal_id: u64,
        nullifier_hash: Fr,
        vote_value: u64,
        proof: &Proof,
    ) -> Result<(), RegistryError> {
        let now = self.clock.now();

        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(RegistryError::ProposalNotFound(proposal_id))?;
        let choice = VoteChoice::from_value(vote_value)
            .ok_or(RegistryError::InvalidVoteValue(vote_value))?;
        if now > proposal.deadline {
            return Err(RegistryError::VotingClosed(proposal_id));
        }
        if proposal.nullifier_used(&nullifier_hash) {
            return Err(RegistryError::NullifierReused(proposal_id));
        }

        let public_inputs: [Fr; PUBLIC_INPUT_COUNT] = [
            self.root,
            nullifier_hash,
            Fr::from(proposal_id),
            Fr::from(vote_value),
        ];
        if !self.oracle.verify(proof, &public_inputs) {
            return Err(RegistryError::ProofRejected);
        }

        // Atomic from here: consume the nullifier and bump exactly
        // one tally
        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(RegistryError::ProposalNotFound(proposal_id))?;
        proposal.nullifiers.insert(nullifier_hash);
        match choice {
            VoteChoice::No => proposal.no_votes += 1,
            VoteChoice::Yes => proposal.yes_votes += 1,
            VoteChoice::Abstain => proposal.abstain_votes += 1,
        }

        info!(proposal_id, ?choice, "vote cast");
        self.events.push(RegistryEvent::VoteCast {
            proposal_id,
            nullifier_hash,
            choice,
        });
        Ok(())
    }

    /// Current tallies as `(yes, no, abstain)`. Pure read.
    pub fn proposal_votes(&self, proposal_id: u64) -> Result<(u64, u64, u64), RegistryError> {
        let proposal = self
            .proposals
            .get(&proposal_id)
            .ok_or(RegistryError::ProposalNotFound(proposal_id))?;
        Ok((
            proposal.yes_votes,
            proposal.no_votes,
            proposal.abstain_votes,
        ))
    }

    /// One-way transition to Executed, allowed only after the
    /// deadline has passed. The post-execution action is deliberately
    /// left to the caller.
    pub fn execute_proposal(&mut self, proposal_id: u64) -> Result<(), RegistryError> {
        let now = self.clock.now();
        let proposal = self
            .proposals
            .get_mut(&proposal_id)
            .ok_or(RegistryError::ProposalNotFound(proposal_id))?;

        if proposal.executed {
            return Err(RegistryError::AlreadyExecuted(proposal_id));
        }
        if now <= proposal.deadline {
            return Err(RegistryError::VotingNotYetClosed(proposal_id));
        }

        proposal.executed = true;
        info!(proposal_id, "proposal executed");
        self.events.push(RegistryEvent::ProposalExecuted { id: proposal_id });
        Ok(())
    }

    /// Read access to a proposal
    pub fn proposal(&self, proposal_id: u64) -> Option<&Proposal> {
        self.proposals.get(&proposal_id)
    }

    /// Emitted events, oldest first
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }
}
