use std::sync::Arc;

use game_core::{
    Bonus, BonusId, BonusKind, Claim, ClaimError, DungeonSpec, MismatchReason, SeekerId,
    SeekerProfile, SeekerRates, SessionConfig, SessionError, SessionPhase, SlotId, Tick, Vitals,
};
use runtime::{
    ClaimEvent, Event, EventRepository, InMemoryEventRepository, ManualClock, Runtime,
    RuntimeError, Scenario, SeekerRegistry, SessionEvent, SessionIndex, Step, StepAction, Topic,
};
use zk::{AttestationKey, AttestationProver, Prover};

fn registry() -> SeekerRegistry {
    let mut registry = SeekerRegistry::new();
    for (id, harvest) in [(1, 5), (2, 6), (3, 4)] {
        registry.add_seeker(
            SeekerId(id),
            SeekerProfile {
                vitals: Vitals::new(0, 100),
                rates: SeekerRates {
                    attack_armour: 2,
                    attack_health: 2,
                    harvest,
                    yield_bonus: 0,
                },
            },
        );
    }
    registry.with_bonus(BonusId(1), Bonus::new(BonusKind::Harvest, 2))
}

fn prover() -> AttestationProver {
    AttestationProver::new(AttestationKey::from_secret(b"runtime-tests"))
}

async fn start(session: SessionConfig, clock: &ManualClock) -> Runtime {
    Runtime::builder()
        .session(session)
        .seekers(registry())
        .clock(clock.clone())
        .verifier(Arc::new(prover().verifier()))
        .build()
        .await
        .expect("runtime should start")
}

/// Three seekers harvest for ten ticks, then each claims directly.
#[tokio::test]
async fn harvest_session_end_to_end() {
    let clock = ManualClock::new(100);
    let runtime = start(SessionConfig::harvest(50, 3), &clock).await;
    let handle = runtime.handle();
    let mut session_rx = handle.subscribe(Topic::Session);

    for (slot, seeker) in [(0, 1), (1, 2), (2, 3)] {
        handle
            .join(SeekerId(seeker), SlotId(slot))
            .await
            .expect("join should succeed");
    }
    assert_eq!(handle.phase().await.unwrap(), SessionPhase::Active);
    assert_eq!(handle.iteration().await.unwrap(), 1);

    clock.advance(10);
    for (slot, seeker) in [(0, 1), (1, 2), (2, 3)] {
        handle
            .leave(SeekerId(seeker), SlotId(slot))
            .await
            .expect("leave should succeed");
    }

    // spawn + 3 joins + 3 leaves
    let mut events = Vec::new();
    for _ in 0..7 {
        events.push(session_rx.recv().await.expect("session event"));
    }
    assert!(matches!(
        events[0],
        Event::Session(SessionEvent::Spawned { iteration: 1, start: 100, .. })
    ));
    let index = SessionIndex::from_events(3, &events);
    let slots = handle.slots().await.unwrap();
    assert_eq!(index.commitments(), slots.iter().map(|s| s.commitment).collect::<Vec<_>>());

    clock.advance(10);
    let configs = index.configs();
    let yields = handle.slot_yields(Tick(20), &configs).await.unwrap();
    assert_eq!(yields, vec![50, 60, 40]);

    for slot in 0..3u16 {
        let payout = handle
            .claim_reward(Claim::new(SlotId(slot), Tick(20), yields.clone()), configs.clone())
            .await
            .expect("honest claim should pay");
        assert_eq!(payout.amount, yields[slot as usize]);
    }
    let claimed: Vec<u64> = handle.slots().await.unwrap().iter().map(|s| s.claimed).collect();
    assert_eq!(claimed, yields);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_command_leaves_session_untouched() {
    let clock = ManualClock::new(0);
    let runtime = start(SessionConfig::harvest(50, 2), &clock).await;
    let handle = runtime.handle();
    let mut session_rx = handle.subscribe(Topic::Session);

    handle.join(SeekerId(1), SlotId(0)).await.unwrap();
    let before = handle.snapshot().await.unwrap().session;

    let err = handle.join(SeekerId(2), SlotId(0)).await.unwrap_err();
    assert!(err.is_rejection());
    let err = match err {
        RuntimeError::Execute(err) => err,
        other => panic!("expected an execute error, got {other:?}"),
    };
    assert!(matches!(err.session_error(), SessionError::Action(_)));

    let err = handle.join(SeekerId(9), SlotId(1)).await.unwrap_err();
    let err = match err {
        RuntimeError::Execute(err) => err,
        other => panic!("expected an execute error, got {other:?}"),
    };
    assert_eq!(err.session_error(), &SessionError::UnknownSeeker(SeekerId(9)));

    assert_eq!(handle.snapshot().await.unwrap().session, before);

    // spawn, join, then the two rejections
    for _ in 0..2 {
        session_rx.recv().await.unwrap();
    }
    for _ in 0..2 {
        let event = session_rx.recv().await.unwrap();
        assert!(matches!(event, Event::Session(SessionEvent::CommandRejected { .. })));
    }

    runtime.shutdown().await.unwrap();
}

/// Direct and proof-carrying claims accept and reject the same claims.
#[tokio::test]
async fn proof_and_direct_claims_agree() {
    let clock = ManualClock::new(0);
    let spec = DungeonSpec::uniform(0, 1_000, 2, 0, 1).with_defeat_reward(0);
    let runtime = start(SessionConfig::dungeon(40, spec), &clock).await;
    let handle = runtime.handle();

    handle.join(SeekerId(1), SlotId(0)).await.unwrap();
    clock.advance(3);
    handle.join(SeekerId(2), SlotId(1)).await.unwrap();
    clock.advance(5);
    handle
        .equip(SeekerId(2), SlotId(1), BonusId(1))
        .await
        .unwrap();
    clock.advance(12);

    let snapshot = handle.snapshot().await.unwrap();
    let configs = snapshot.session.log().configs();
    let prover = prover();
    let proven = prover
        .prove(&snapshot.session, Tick(20), &configs)
        .expect("prover should accept on-record logs");

    let direct = handle
        .claim_reward(proven.claim(SlotId(0)), configs.clone())
        .await
        .expect("direct claim");
    let with_proof = handle
        .claim_with_proof(proven.claim(SlotId(1)), proven.proof.clone())
        .await
        .expect("proof claim");
    assert_eq!(direct.amount, proven.statement.yields[0]);
    assert_eq!(with_proof.amount, proven.statement.yields[1]);

    // the same proof does not cover inflated yields
    let mut inflated = proven.claim(SlotId(1));
    inflated.yields[1] += 1;
    let err = handle
        .claim_with_proof(inflated.clone(), proven.proof.clone())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Claim(ClaimError::Mismatch(MismatchReason::Proof))
    ));
    let err = handle.claim_reward(inflated, configs).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Claim(ClaimError::Mismatch(MismatchReason::Yields { .. }))
    ));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn events_are_persisted_in_order() {
    let clock = ManualClock::new(0);
    let repository = InMemoryEventRepository::new("test");
    let runtime = Runtime::builder()
        .session(SessionConfig::harvest(20, 1))
        .seekers(registry())
        .clock(clock.clone())
        .repository(repository.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    handle.join(SeekerId(1), SlotId(0)).await.unwrap();
    clock.advance(4);
    let configs = handle.snapshot().await.unwrap().session.log().configs();
    handle
        .claim_reward(Claim::new(SlotId(0), Tick(4), vec![20]), configs.clone())
        .await
        .unwrap();
    let err = handle
        .claim_reward(Claim::new(SlotId(0), Tick(9), vec![45]), configs)
        .await
        .unwrap_err();
    assert!(err.is_rejection());
    runtime.shutdown().await.unwrap();

    let events = repository.read_all().unwrap();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[1], Event::Session(SessionEvent::SlotUpdated { at: 0, .. })));
    assert!(matches!(
        events[2],
        Event::Claim(ClaimEvent::Paid { proven: false, .. })
    ));
    assert!(matches!(events[3], Event::Claim(ClaimEvent::Rejected { .. })));

    let index = SessionIndex::from_events(1, &events);
    assert_eq!(index.slots()[0].claimed, 20);
}

#[tokio::test]
async fn proof_claim_without_verifier_fails() {
    let clock = ManualClock::new(0);
    let runtime = Runtime::builder()
        .session(SessionConfig::harvest(20, 1))
        .seekers(registry())
        .clock(clock.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle.join(SeekerId(1), SlotId(0)).await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    let proven = prover()
        .prove(&snapshot.session, Tick(0), &snapshot.session.log().configs())
        .unwrap();
    let err = handle
        .claim_with_proof(proven.claim(SlotId(0)), proven.proof)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::VerifierNotSet));
    assert!(!err.is_rejection());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn scenario_runs_through_the_handle() {
    let scenario = Scenario {
        name: "respawn".into(),
        session: SessionConfig::harvest(10, 2),
        registry: registry(),
        steps: vec![
            Step {
                at: 0,
                action: StepAction::Join {
                    seeker: SeekerId(1),
                    slot: SlotId(0),
                },
            },
            Step {
                at: 2,
                action: StepAction::Drink {
                    seeker: SeekerId(1),
                    slot: SlotId(0),
                    bonus: BonusId(1),
                },
            },
            Step {
                at: 2,
                action: StepAction::Join {
                    seeker: SeekerId(1),
                    slot: SlotId(1),
                },
            },
            Step {
                at: 10,
                action: StepAction::ProveAndClaim { slot: SlotId(0) },
            },
            // regen window: joining is refused until tick 21
            Step {
                at: 15,
                action: StepAction::Join {
                    seeker: SeekerId(2),
                    slot: SlotId(1),
                },
            },
        ],
    };

    let clock = ManualClock::new(0);
    let runtime = start(scenario.session.clone(), &clock).await;
    let report = scenario
        .run(&runtime.handle(), &clock, &prover())
        .await
        .expect("scenario should run");

    assert_eq!(report.rejected(), 2);
    assert!(report.steps[2].error.is_some(), "seeker 1 is already seated");
    // 5 per tick for 10 ticks plus a +2 drink from tick 2
    assert_eq!(report.steps[3].payout, Some(66));
    assert!(report.steps[4].error.is_some());
    assert_eq!(report.phase, "regen");
    assert_eq!(report.slots[0].claimed, 66);

    runtime.shutdown().await.unwrap();
}
