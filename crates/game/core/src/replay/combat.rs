//! Dungeon-combat replay.
//!
//! Reproduces a per-tick simulation in which every participant alive at the
//! start of a tick acts during that tick:
//!
//! - dungeon armour loses the sum of the fighting seekers' armour attacks;
//! - dungeon health loses the sum of their health attacks, but only on ticks
//!   that start with dungeon armour at zero;
//! - while the dungeon lives, each fighting seeker loses the dungeon's
//!   per-slot armour attack, and health once its own armour is gone;
//! - each fighting seeker accrues its yield rate.
//!
//! Instead of stepping tick by tick, time advances in spans over which every
//! rate is constant. A span ends at the next config tick, the target, or the
//! first tick on which any pool changes gating (armour breaks or health runs
//! out), so every span is integrated exactly with [`GatedPool::advance`].

use super::harvest::Occupancy;
use super::{ReplayError, validate_configs};
use crate::combat::GatedPool;
use crate::state::{DungeonSpec, DungeonState, SlotAction, SlotConfig, SlotId, Tick, Vitals};

/// Result of replaying every slot of a dungeon session up to a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionReplay {
    /// Cumulative yield per slot, defeat reward included.
    pub yields: Vec<u64>,
    pub dungeon: DungeonState,
    /// Remaining pools of each slot's latest occupant.
    pub seekers: Vec<Vitals>,
}

#[derive(Clone, Debug, Default)]
struct Fighter {
    occupancy: Occupancy,
    pool: GatedPool,
    earned: u64,
    cursor: usize,
}

impl Fighter {
    fn is_fighting(&self) -> bool {
        self.occupancy.present && !self.pool.is_depleted()
    }
}

/// Replays all slots of a dungeon session up to `target`.
///
/// `configs[i]` is the log of slot `i`. Slots beyond the dungeon's attack
/// table are never attacked.
///
/// # Errors
///
/// [`ReplayError::Malformed`] if any slot's log is malformed.
pub fn replay_session(
    spec: &DungeonSpec,
    configs: &[Vec<SlotConfig>],
    target: Tick,
) -> Result<SessionReplay, ReplayError> {
    for (index, log) in configs.iter().enumerate() {
        validate_configs(slot_id(index), log)?;
    }

    let mut dungeon = GatedPool::new(spec.armour, spec.health);
    let mut defeated_at = None;
    let mut fighters = vec![Fighter::default(); configs.len()];
    let mut now = Tick::ZERO;

    while now < target {
        // configs stamped at or before `now` take effect for this span
        for (fighter, log) in fighters.iter_mut().zip(configs) {
            while let Some(config) = log.get(fighter.cursor).filter(|c| c.tick <= now) {
                fighter.occupancy.apply(&config.action);
                if let SlotAction::Enter { vitals, .. } = config.action {
                    fighter.pool = GatedPool::new(vitals.armour, vitals.health);
                }
                fighter.cursor += 1;
            }
        }

        let dungeon_alive = !dungeon.is_depleted();
        let (armour_rate, health_rate) = fighters
            .iter()
            .filter(|fighter| fighter.is_fighting())
            .map(|fighter| fighter.occupancy.rates())
            .fold((0u64, 0u64), |(armour, health), rates| {
                (
                    armour.saturating_add(rates.attack_armour),
                    health.saturating_add(rates.attack_health),
                )
            });

        let mut span = target.since(now);
        for (fighter, log) in fighters.iter().zip(configs) {
            if let Some(next) = log.get(fighter.cursor) {
                span = span.min(next.tick.since(now));
            }
        }
        if dungeon_alive {
            if let Some(ticks) = dungeon.ticks_until_transition(armour_rate, health_rate) {
                span = span.min(ticks);
            }
            for (index, fighter) in fighters.iter().enumerate() {
                if !fighter.is_fighting() {
                    continue;
                }
                let slot = slot_id(index);
                let transition = fighter.pool.ticks_until_transition(
                    spec.attack_armour_at(slot),
                    spec.attack_health_at(slot),
                );
                if let Some(ticks) = transition {
                    span = span.min(ticks);
                }
            }
        }

        let fighting: Vec<bool> = fighters.iter().map(Fighter::is_fighting).collect();
        for (index, fighter) in fighters.iter_mut().enumerate() {
            if !fighting[index] {
                continue;
            }
            let yield_rate = fighter.occupancy.rates().yield_rate();
            fighter.earned = fighter
                .earned
                .saturating_add(yield_rate.saturating_mul(span));
            if dungeon_alive {
                let slot = slot_id(index);
                fighter.pool = fighter.pool.advance(
                    spec.attack_armour_at(slot),
                    spec.attack_health_at(slot),
                    span,
                );
            }
        }

        if dungeon_alive {
            dungeon = dungeon.advance(armour_rate, health_rate, span);
            if dungeon.is_depleted() {
                let last_tick = now + (span - 1);
                defeated_at = Some(last_tick);
                // everyone fighting at the start of the final tick shares the reward
                let survivors = fighting.iter().filter(|alive| **alive).count() as u64;
                tracing::debug!(tick = %last_tick, survivors, "dungeon defeated");
                if survivors > 0 {
                    let share = spec.defeat_reward / survivors;
                    for (fighter, _) in fighters
                        .iter_mut()
                        .zip(&fighting)
                        .filter(|(_, alive)| **alive)
                    {
                        fighter.earned = fighter.earned.saturating_add(share);
                    }
                }
            }
        }

        now = now + span;
    }

    Ok(SessionReplay {
        yields: fighters.iter().map(|fighter| fighter.earned).collect(),
        dungeon: DungeonState {
            armour: dungeon.armour,
            health: dungeon.health,
            defeated_at,
        },
        seekers: fighters
            .iter()
            .map(|fighter| Vitals::new(fighter.pool.armour, fighter.pool.health))
            .collect(),
    })
}

fn slot_id(index: usize) -> SlotId {
    SlotId(u16::try_from(index).unwrap_or(u16::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BonusId, SeekerId, SeekerRates};

    fn rates(attack: u64, harvest: u64) -> SeekerRates {
        SeekerRates {
            attack_armour: attack,
            attack_health: attack,
            harvest,
            yield_bonus: 0,
        }
    }

    fn enter(tick: u64, seeker: u32, vitals: Vitals, rates: SeekerRates) -> SlotConfig {
        SlotConfig::enter(Tick(tick), SeekerId(seeker), vitals, rates)
    }

    /// Tick-by-tick reference simulation.
    fn naive(spec: &DungeonSpec, configs: &[Vec<SlotConfig>], target: Tick) -> SessionReplay {
        let mut dungeon = GatedPool::new(spec.armour, spec.health);
        let mut defeated_at = None;
        let mut fighters = vec![Fighter::default(); configs.len()];

        for tick in 0..target.0 {
            for (fighter, log) in fighters.iter_mut().zip(configs) {
                for config in log.iter().filter(|c| c.tick == Tick(tick)) {
                    fighter.occupancy.apply(&config.action);
                    if let SlotAction::Enter { vitals, .. } = config.action {
                        fighter.pool = GatedPool::new(vitals.armour, vitals.health);
                    }
                }
            }

            let dungeon_alive = !dungeon.is_depleted();
            let dungeon_gate_open = dungeon.armour == 0;
            let fighting: Vec<bool> = fighters.iter().map(Fighter::is_fighting).collect();

            for (index, fighter) in fighters.iter_mut().enumerate() {
                if !fighting[index] {
                    continue;
                }
                let rates = fighter.occupancy.rates();
                dungeon.armour = dungeon.armour.saturating_sub(rates.attack_armour);
                if dungeon_gate_open {
                    dungeon.health = dungeon.health.saturating_sub(rates.attack_health);
                }
                fighter.earned += rates.yield_rate();
                if dungeon_alive {
                    let slot = slot_id(index);
                    let gate_open = fighter.pool.armour == 0;
                    fighter.pool.armour =
                        fighter.pool.armour.saturating_sub(spec.attack_armour_at(slot));
                    if gate_open {
                        fighter.pool.health =
                            fighter.pool.health.saturating_sub(spec.attack_health_at(slot));
                    }
                }
            }

            if dungeon_alive && dungeon.is_depleted() {
                defeated_at = Some(Tick(tick));
                let survivors = fighting.iter().filter(|alive| **alive).count() as u64;
                let share = spec.defeat_reward / survivors;
                for (fighter, alive) in fighters.iter_mut().zip(&fighting) {
                    if *alive {
                        fighter.earned += share;
                    }
                }
            }
        }

        SessionReplay {
            yields: fighters.iter().map(|f| f.earned).collect(),
            dungeon: DungeonState {
                armour: dungeon.armour,
                health: dungeon.health,
                defeated_at,
            },
            seekers: fighters
                .iter()
                .map(|f| Vitals::new(f.pool.armour, f.pool.health))
                .collect(),
        }
    }

    /// Small deterministic generator for randomized logs.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            self.0 >> 33
        }

        fn below(&mut self, bound: u64) -> u64 {
            self.next() % bound
        }
    }

    fn random_log(rng: &mut Lcg, seeker: u32) -> Vec<SlotConfig> {
        let mut log = Vec::new();
        let mut tick = rng.below(5);
        let mut occupied = false;
        let mut bonus = 0;
        for _ in 0..rng.below(7) {
            let config = if !occupied {
                occupied = true;
                enter(
                    tick,
                    seeker,
                    Vitals::new(rng.below(30), 1 + rng.below(40)),
                    rates(rng.below(6), rng.below(4)),
                )
            } else {
                bonus += 1;
                match rng.below(3) {
                    0 => {
                        occupied = false;
                        SlotConfig::leave(Tick(tick))
                    }
                    1 => SlotConfig::equip(Tick(tick), BonusId(bonus), rates(rng.below(8), rng.below(5))),
                    _ => SlotConfig::drink(Tick(tick), BonusId(bonus), rates(rng.below(3), rng.below(3))),
                }
            };
            log.push(config);
            tick += rng.below(6);
        }
        log
    }

    #[test]
    fn armour_breaks_before_health() {
        // two seekers hitting 2 each against 100 armour, no attack back
        let spec = DungeonSpec::uniform(100, 100, 2, 0, 0);
        let configs = vec![
            vec![enter(0, 1, Vitals::new(10, 10), rates(2, 0))],
            vec![enter(0, 2, Vitals::new(10, 10), rates(2, 0))],
        ];

        let replay = replay_session(&spec, &configs, Tick(25)).unwrap();
        assert_eq!(replay.dungeon.armour, 0);
        assert_eq!(replay.dungeon.health, 100);

        let replay = replay_session(&spec, &configs, Tick(26)).unwrap();
        assert_eq!(replay.dungeon.health, 96);
    }

    #[test]
    fn defeat_reward_skips_seekers_who_left() {
        let spec = DungeonSpec::uniform(0, 40, 2, 0, 0).with_defeat_reward(100);
        let stayer = vec![enter(0, 1, Vitals::new(5, 5), rates(2, 1))];
        let leaver = vec![
            enter(0, 2, Vitals::new(5, 5), rates(2, 1)),
            SlotConfig::leave(Tick(5)),
        ];
        let replay = replay_session(&spec, &[stayer.clone(), leaver], Tick(50)).unwrap();

        // 5 ticks at 4 + 10 ticks at 2 = 40 health
        assert_eq!(replay.dungeon.defeated_at, Some(Tick(14)));
        assert_eq!(replay.yields, vec![50 + 100, 5]);

        let both = vec![stayer.clone(), stayer];
        let replay = replay_session(&spec, &both, Tick(50)).unwrap();
        assert_eq!(replay.yields, vec![50 + 50, 50 + 50]);
    }

    #[test]
    fn dead_seeker_stops_yielding() {
        let spec = DungeonSpec::uniform(1_000, 1_000, 1, 5, 5);
        let configs = vec![vec![enter(0, 1, Vitals::new(10, 10), rates(1, 3))]];
        // armour gone after 2 ticks, health after 2 more
        let replay = replay_session(&spec, &configs, Tick(100)).unwrap();
        assert_eq!(replay.seekers[0], Vitals::new(0, 0));
        assert_eq!(replay.yields[0], 4 * 3);
    }

    #[test]
    fn equip_keeps_accumulated_yield() {
        let spec = DungeonSpec::uniform(1_000, 1_000, 1, 0, 0);
        let base = vec![enter(0, 1, Vitals::new(10, 10), rates(0, 2))];
        let mut equipped = base.clone();
        equipped.push(SlotConfig::equip(Tick(10), BonusId(1), rates(0, 5)));

        let before = replay_session(&spec, &[base], Tick(20)).unwrap();
        let after = replay_session(&spec, &[equipped], Tick(20)).unwrap();
        assert_eq!(before.yields[0], 40);
        assert_eq!(after.yields[0], 20 + 50);
    }

    #[test]
    fn replay_is_deterministic_and_monotonic() {
        let mut rng = Lcg(7);
        let spec = DungeonSpec::uniform(60, 80, 3, 2, 3).with_defeat_reward(30);
        let configs: Vec<_> = (0..3).map(|seeker| random_log(&mut rng, seeker)).collect();

        let mut previous = vec![0; 3];
        for target in 0..60 {
            let first = replay_session(&spec, &configs, Tick(target)).unwrap();
            let second = replay_session(&spec, &configs, Tick(target)).unwrap();
            assert_eq!(first, second);
            for (now, before) in first.yields.iter().zip(&previous) {
                assert!(now >= before, "target {target}");
            }
            previous = first.yields;
        }
    }

    #[test]
    fn piecewise_matches_naive_simulation() {
        let mut rng = Lcg(0x5eed);
        for case in 0..300 {
            let slots = 1 + rng.below(4) as usize;
            let mut spec = DungeonSpec::uniform(rng.below(80), 1 + rng.below(120), slots, 0, 0)
                .with_defeat_reward(rng.below(50));
            for slot in 0..slots {
                spec.attack_armour[slot] = rng.below(4);
                spec.attack_health[slot] = rng.below(4);
            }
            let configs: Vec<_> = (0..slots)
                .map(|seeker| random_log(&mut rng, seeker as u32))
                .collect();
            let target = Tick(rng.below(60));

            assert_eq!(
                replay_session(&spec, &configs, target).unwrap(),
                naive(&spec, &configs, target),
                "case {case}: {spec:?} {configs:?} target {target}"
            );
        }
    }

    #[test]
    fn malformed_slot_is_reported() {
        let spec = DungeonSpec::uniform(10, 10, 2, 1, 1);
        let configs = vec![
            vec![enter(0, 1, Vitals::new(1, 1), rates(1, 1))],
            vec![SlotConfig::leave(Tick(0))],
        ];
        let err = replay_session(&spec, &configs, Tick(5)).unwrap_err();
        assert!(matches!(err, ReplayError::Malformed { slot: SlotId(1), .. }));
    }
}
