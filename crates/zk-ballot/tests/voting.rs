//! End-to-end voting scenarios: real Groth16 proofs from campaign
//! setup through registry tallies.

use ark_bn254::Fr;
use ark_std::rand::rngs::StdRng;
use ark_std::rand::SeedableRng;

use zk_ballot::{
    BallotProver, BallotVerifier, ManualClock, Member, PoseidonHasher, RegistryError,
    RegistryEvent, VoteChoice, VotingRegistry,
};

const START: u64 = 1_000;

/// Four members agreeing on a campaign over the given proposal ids
fn campaign(proposal_ids: &[u64]) -> (BallotProver, Vec<Member>) {
    let hasher = PoseidonHasher::new();
    let mut rng = StdRng::seed_from_u64(0);

    let members: Vec<Member> = (0..4)
        .map(|i| Member::generate(&hasher, i, &mut rng))
        .collect();
    let commitments: Vec<Fr> = members.iter().map(|m| m.commitment).collect();
    let prover = BallotProver::setup(&commitments, proposal_ids, &mut rng).unwrap();

    (prover, members)
}

fn registry_for(
    prover: &BallotProver,
) -> (
    VotingRegistry<BallotVerifier, ManualClock>,
    ManualClock,
) {
    let oracle = BallotVerifier::new(prover.verifying_key()).unwrap();
    let clock = ManualClock::new(START);
    let registry = VotingRegistry::with_clock(prover.root(), oracle, clock.clone());
    (registry, clock)
}

#[test]
fn end_to_end_single_proposal() {
    let (prover, members) = campaign(&[1]);
    let (mut registry, _clock) = registry_for(&prover);
    let mut rng = StdRng::seed_from_u64(1);

    let id = registry.create_proposal("fund the treasury", 3_600);
    assert_eq!(id, 1);

    // Member index 2 votes yes
    let submission = prover
        .prove(&members[2], id, VoteChoice::Yes, &mut rng)
        .unwrap();
    assert_eq!(submission.root(), registry.root());
    assert_eq!(
        submission.nullifier_hash(),
        members[2].nullifier_hash(prover.hasher())
    );

    registry
        .vote(id, submission.nullifier_hash(), 1, &submission.proof)
        .unwrap();
    assert_eq!(registry.proposal_votes(id).unwrap(), (1, 0, 0));
    assert!(matches!(
        registry.events().last(),
        Some(RegistryEvent::VoteCast { proposal_id: 1, .. })
    ));

    // A second, otherwise-valid proof with a different vote value
    // still trips the nullifier check
    let replay = prover
        .prove(&members[2], id, VoteChoice::No, &mut rng)
        .unwrap();
    let err = registry
        .vote(id, replay.nullifier_hash(), 0, &replay.proof)
        .unwrap_err();
    assert_eq!(err, RegistryError::NullifierReused(id));
    assert_eq!(registry.proposal_votes(id).unwrap(), (1, 0, 0));

    // Another member's proof submitted with a tampered vote value is
    // rejected by the oracle and mutates nothing
    let honest = prover
        .prove(&members[0], id, VoteChoice::Yes, &mut rng)
        .unwrap();
    let err = registry
        .vote(id, honest.nullifier_hash(), 2, &honest.proof)
        .unwrap_err();
    assert_eq!(err, RegistryError::ProofRejected);
    assert_eq!(registry.proposal_votes(id).unwrap(), (1, 0, 0));

    // Submitted as generated, it counts
    registry
        .vote(id, honest.nullifier_hash(), 1, &honest.proof)
        .unwrap();
    assert_eq!(registry.proposal_votes(id).unwrap(), (2, 0, 0));
}

#[test]
fn cross_proposal_independence() {
    let (prover, members) = campaign(&[1, 2]);
    let (mut registry, _clock) = registry_for(&prover);
    let mut rng = StdRng::seed_from_u64(1);

    let first = registry.create_proposal("alpha", 3_600);
    let second = registry.create_proposal("beta", 3_600);

    let hasher = prover.hasher();
    let member = &members[1];

    // Same nullifier hash, two distinct proposal-scoped leaves
    assert_ne!(
        hasher.vote_leaf(member.commitment, Fr::from(first)),
        hasher.vote_leaf(member.commitment, Fr::from(second))
    );

    let on_first = prover
        .prove(member, first, VoteChoice::Yes, &mut rng)
        .unwrap();
    let on_second = prover
        .prove(member, second, VoteChoice::Abstain, &mut rng)
        .unwrap();
    assert_eq!(on_first.nullifier_hash(), on_second.nullifier_hash());

    registry
        .vote(first, on_first.nullifier_hash(), 1, &on_first.proof)
        .unwrap();
    registry
        .vote(second, on_second.nullifier_hash(), 2, &on_second.proof)
        .unwrap();

    assert_eq!(registry.proposal_votes(first).unwrap(), (1, 0, 0));
    assert_eq!(registry.proposal_votes(second).unwrap(), (0, 0, 1));
}

#[test]
fn deadline_boundary_and_execution() {
    let (prover, members) = campaign(&[1]);
    let (mut registry, clock) = registry_for(&prover);
    let mut rng = StdRng::seed_from_u64(1);

    let id = registry.create_proposal("timed", 600);
    let deadline = START + 600;

    // Accepted exactly at the deadline
    clock.set(deadline);
    let at_deadline = prover
        .prove(&members[0], id, VoteChoice::Yes, &mut rng)
        .unwrap();
    registry
        .vote(id, at_deadline.nullifier_hash(), 1, &at_deadline.proof)
        .unwrap();

    // Rejected one second later, before any verification work
    clock.set(deadline + 1);
    let too_late = prover
        .prove(&members[1], id, VoteChoice::Yes, &mut rng)
        .unwrap();
    let err = registry
        .vote(id, too_late.nullifier_hash(), 1, &too_late.proof)
        .unwrap_err();
    assert_eq!(err, RegistryError::VotingClosed(id));

    registry.execute_proposal(id).unwrap();
    assert_eq!(
        registry.execute_proposal(id).unwrap_err(),
        RegistryError::AlreadyExecuted(id)
    );
    assert_eq!(registry.proposal_votes(id).unwrap(), (1, 0, 0));
}
