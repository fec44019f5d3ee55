use ark_bn254::Fr;
use ark_crypto_primitives::crh::sha256::constraints::Sha256Gadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use game_core::{
    ClaimStatement, ENCODED_CONFIG_LEN, GameVariant, Session, SlotConfig, encode_config,
};

use super::CircuitShape;
use super::gadgets::{
    enforce_width, is_lt, le_bytes_to_fp, new_flag, pack_digest, pack_digest_var, pick,
};
use crate::prover::ProofError;

/// Expands a statement into the circuit's public inputs.
///
/// Order: tick, yields, commitment limbs (lo, hi per slot), params limbs.
pub fn public_inputs(
    shape: CircuitShape,
    statement: &ClaimStatement,
) -> Result<Vec<Fr>, ProofError> {
    for actual in [statement.yields.len(), statement.commitments.len()] {
        if actual != shape.slots {
            return Err(ProofError::SlotCount {
                expected: shape.slots,
                actual,
            });
        }
    }

    let mut inputs = Vec::with_capacity(shape.public_input_len());
    inputs.push(Fr::from(statement.tick.0));
    inputs.extend(statement.yields.iter().map(|value| Fr::from(*value)));
    for commitment in &statement.commitments {
        inputs.extend(pack_digest(commitment.as_bytes()));
    }
    inputs.extend(pack_digest(&statement.params));
    Ok(inputs)
}

/// Private inputs of one proof.
#[derive(Clone, Debug)]
pub struct YieldWitness {
    pub num_ticks: u64,
    pub iteration: u32,
    /// Encoded configs per slot, zero-padded to the shape.
    pub configs: Vec<Vec<[u8; ENCODED_CONFIG_LEN]>>,
    /// Real configs per slot.
    pub lens: Vec<usize>,
}

/// Harvest yield circuit for one [`CircuitShape`].
#[derive(Clone, Debug)]
pub struct YieldCircuit {
    shape: CircuitShape,
    statement: Option<ClaimStatement>,
    witness: Option<YieldWitness>,
}

impl YieldCircuit {
    /// Unassigned instance, for key generation.
    pub fn blank(shape: CircuitShape) -> Self {
        Self {
            shape,
            statement: None,
            witness: None,
        }
    }

    /// Assigns `statement` and the logs it was replayed from.
    ///
    /// # Errors
    ///
    /// [`ProofError::UnsupportedVariant`] for dungeon sessions,
    /// [`ProofError::ShapeMismatch`] when the session or a log does not fit.
    pub fn new(
        shape: CircuitShape,
        session: &Session,
        statement: ClaimStatement,
        configs: &[Vec<SlotConfig>],
    ) -> Result<Self, ProofError> {
        if !matches!(session.config().variant, GameVariant::Harvest) {
            return Err(ProofError::UnsupportedVariant);
        }
        let longest = configs.iter().map(Vec::len).max().unwrap_or(0);
        if configs.len() != shape.slots || longest > shape.configs_per_slot {
            return Err(ProofError::ShapeMismatch {
                shape,
                slots: configs.len(),
                configs: longest,
            });
        }

        let witness = YieldWitness {
            num_ticks: session.config().num_ticks,
            iteration: session.iteration(),
            configs: configs
                .iter()
                .map(|log| {
                    let mut encoded: Vec<_> = log.iter().map(encode_config).collect();
                    encoded.resize(shape.configs_per_slot, [0u8; ENCODED_CONFIG_LEN]);
                    encoded
                })
                .collect(),
            lens: configs.iter().map(Vec::len).collect(),
        };
        Ok(Self {
            shape,
            statement: Some(statement),
            witness: Some(witness),
        })
    }

    pub fn shape(&self) -> CircuitShape {
        self.shape
    }

    fn slot_configs(&self, slot: usize, index: usize) -> Option<[u8; ENCODED_CONFIG_LEN]> {
        self.witness
            .as_ref()
            .and_then(|witness| witness.configs.get(slot))
            .and_then(|configs| configs.get(index))
            .copied()
    }

    fn slot_len(&self, slot: usize) -> Option<usize> {
        self.witness
            .as_ref()
            .and_then(|witness| witness.lens.get(slot))
            .copied()
    }

    /// Binds `params` to a harvest session of `shape.slots` slots.
    fn enforce_params(
        &self,
        cs: ConstraintSystemRef<Fr>,
        params: &[FpVar<Fr>; 2],
    ) -> Result<(), SynthesisError> {
        let witness = self.witness.as_ref();
        let num_ticks = witness.map_or([None; 8], |w| w.num_ticks.to_le_bytes().map(Some));
        let iteration = witness.map_or([None; 4], |w| w.iteration.to_le_bytes().map(Some));

        let mut preimage = UInt8::constant_vec(Session::PARAMS_DOMAIN);
        preimage.extend(UInt8::new_witness_vec(cs.clone(), &num_ticks[..])?);
        preimage.extend(UInt8::constant_vec(&(self.shape.slots as u64).to_le_bytes()));
        preimage.extend(UInt8::new_witness_vec(cs, &iteration[..])?);
        // harvest variant tag
        preimage.push(UInt8::constant(0));

        let digest = Sha256Gadget::<Fr>::digest(&preimage)?;
        let packed = pack_digest_var(&digest.0)?;
        packed[0].enforce_equal(&params[0])?;
        packed[1].enforce_equal(&params[1])
    }

    /// Re-derives one slot's commitment and returns its yield at `tick`.
    fn slot_yield(
        &self,
        cs: ConstraintSystemRef<Fr>,
        slot: usize,
        tick: &FpVar<Fr>,
        commitment: &[FpVar<Fr>; 2],
    ) -> Result<FpVar<Fr>, SynthesisError> {
        let positions = self.shape.configs_per_slot;
        let len = self.slot_len(slot);

        // real[k] is set for the first len positions only
        let real = (0..positions)
            .map(|k| new_flag(cs.clone(), len.map(|n| k < n)))
            .collect::<Result<Vec<_>, _>>()?;
        for k in 1..positions {
            (&real[k] * (FpVar::one() - &real[k - 1])).enforce_equal(&FpVar::zero())?;
        }

        let mut head = UInt8::constant_vec(&[0u8; 32]);
        let mut heads = vec![pack_digest_var(&head)?];
        let mut configs = Vec::with_capacity(positions);
        for k in 0..positions {
            let values = self
                .slot_configs(slot, k)
                .map_or([None; ENCODED_CONFIG_LEN], |bytes| bytes.map(Some));
            let encoded = UInt8::new_witness_vec(cs.clone(), &values[..])?;

            let mut message = head;
            message.extend_from_slice(&encoded);
            head = Sha256Gadget::<Fr>::digest(&message)?.0;
            heads.push(pack_digest_var(&head)?);
            configs.push(ConfigVar::decode(&encoded)?);
        }

        // exactly one selector is set: the one at the log length
        let selectors: Vec<FpVar<Fr>> = (0..=positions)
            .map(|k| {
                let before = if k == 0 { FpVar::one() } else { real[k - 1].clone() };
                let after = real.get(k).cloned().unwrap_or_else(FpVar::zero);
                before - after
            })
            .collect();
        for limb in 0..2 {
            let mut gap = FpVar::zero();
            for (selector, head) in selectors.iter().zip(&heads) {
                gap += selector * (&head[limb] - &commitment[limb]);
            }
            gap.enforce_equal(&FpVar::zero())?;
        }

        let mut present = FpVar::zero();
        let mut base = FpVar::zero();
        let mut boost = FpVar::zero();
        let mut total = FpVar::zero();
        for (k, config) in configs.iter().enumerate() {
            let [enter, equip, drink, leave] = config.actions()?;
            (&enter + &equip + &drink + &leave - FpVar::one())
                .mul_equals(&real[k], &FpVar::zero())?;

            present = &enter + (&equip + &drink) * &present;
            base = &base + (&enter + &equip) * (&config.rate - &base);
            boost = (&drink + &equip) * &boost + &drink * &config.rate;
            let rate = &present * (&base + &boost);

            let active = &real[k] * is_lt(cs.clone(), &config.tick, tick)?;
            let next = match (real.get(k + 1), configs.get(k + 1)) {
                (Some(flag), Some(next)) => pick(flag, &next.tick, tick),
                _ => tick.clone(),
            };
            let end = pick(&is_lt(cs.clone(), &next, tick)?, &next, tick);
            total += active * rate * (end - &config.tick);
        }
        Ok(total)
    }
}

/// Fields of one encoded config the replay reads.
struct ConfigVar {
    tick: FpVar<Fr>,
    code: FpVar<Fr>,
    /// `harvest + yield_bonus`
    rate: FpVar<Fr>,
}

impl ConfigVar {
    fn decode(encoded: &[UInt8<Fr>]) -> Result<Self, SynthesisError> {
        Ok(Self {
            tick: le_bytes_to_fp(&encoded[0..8])?,
            code: le_bytes_to_fp(&encoded[8..9])?,
            rate: le_bytes_to_fp(&encoded[45..53])? + le_bytes_to_fp(&encoded[53..61])?,
        })
    }

    /// Enter, equip, drink and leave flags, in action code order.
    fn actions(&self) -> Result<[FpVar<Fr>; 4], SynthesisError> {
        let flag = |code: u64| -> Result<FpVar<Fr>, SynthesisError> {
            self.code
                .is_eq(&FpVar::constant(Fr::from(code)))
                .map(FpVar::from)
        };
        Ok([flag(0)?, flag(1)?, flag(2)?, flag(3)?])
    }
}

impl ConstraintSynthesizer<Fr> for YieldCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let statement = self.statement.as_ref();
        let digest_input = |bytes: Option<[u8; 32]>| -> Result<[FpVar<Fr>; 2], SynthesisError> {
            let limbs = bytes.map(|bytes| pack_digest(&bytes));
            let lo = FpVar::new_input(cs.clone(), || {
                limbs.map(|l| l[0]).ok_or(SynthesisError::AssignmentMissing)
            })?;
            let hi = FpVar::new_input(cs.clone(), || {
                limbs.map(|l| l[1]).ok_or(SynthesisError::AssignmentMissing)
            })?;
            Ok([lo, hi])
        };

        // allocation order must follow `public_inputs`
        let tick = FpVar::new_input(cs.clone(), || {
            statement
                .map(|s| Fr::from(s.tick.0))
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        let yields = (0..self.shape.slots)
            .map(|slot| {
                FpVar::new_input(cs.clone(), || {
                    statement
                        .and_then(|s| s.yields.get(slot))
                        .map(|value| Fr::from(*value))
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let commitments = (0..self.shape.slots)
            .map(|slot| {
                digest_input(
                    statement
                        .and_then(|s| s.commitments.get(slot))
                        .map(|commitment| *commitment.as_bytes()),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let params = digest_input(statement.map(|s| s.params))?;

        enforce_width(cs.clone(), &tick, 64)?;
        self.enforce_params(cs.clone(), &params)?;
        for (slot, (claimed, commitment)) in yields.iter().zip(&commitments).enumerate() {
            self.slot_yield(cs.clone(), slot, &tick, commitment)?
                .enforce_equal(claimed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ark_relations::r1cs::ConstraintSystem;
    use game_core::{BonusId, DungeonSpec, SeekerId, SessionConfig, SlotId, Tick};

    use super::*;
    use crate::prover::prepare_statement;
    use crate::testing::{Fixed, played_session};

    fn satisfied(circuit: YieldCircuit) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    fn circuit_for(session: &Session, tick: u64, shape: CircuitShape) -> YieldCircuit {
        let configs = session.log().configs();
        let statement = prepare_statement(session, Tick(tick), &configs).unwrap();
        YieldCircuit::new(shape, session, statement, &configs).unwrap()
    }

    #[test]
    fn honest_replay_satisfies_the_circuit() {
        let session = played_session();
        assert!(satisfied(circuit_for(&session, 20, CircuitShape::new(2, 2))));
        // before the leave, and with spare positions
        assert!(satisfied(circuit_for(&session, 4, CircuitShape::new(2, 3))));
    }

    #[test]
    fn boosts_and_reentry_follow_the_replay() {
        let mut session = Session::new(SessionConfig::harvest(40, 1));
        session.join(0, SeekerId(1), SlotId(0), &Fixed).unwrap();
        session.drink(2, SeekerId(1), SlotId(0), BonusId(1), &Fixed).unwrap();
        session.equip(4, SeekerId(1), SlotId(0), BonusId(1), &Fixed).unwrap();
        session.leave(6, SeekerId(1), SlotId(0), &Fixed).unwrap();
        session.join(8, SeekerId(1), SlotId(0), &Fixed).unwrap();

        for tick in [0, 3, 5, 7, 12] {
            assert!(
                satisfied(circuit_for(&session, tick, CircuitShape::new(1, 5))),
                "tick {tick}"
            );
        }
    }

    #[test]
    fn inflated_yield_is_unsatisfiable() {
        let session = played_session();
        let configs = session.log().configs();
        let mut statement = prepare_statement(&session, Tick(20), &configs).unwrap();
        statement.yields[1] += 1;
        let circuit = YieldCircuit::new(CircuitShape::new(2, 2), &session, statement, &configs)
            .unwrap();
        assert!(!satisfied(circuit));
    }

    #[test]
    fn truncated_log_does_not_open_the_commitment() {
        let session = played_session();
        let configs = session.log().configs();
        let statement = prepare_statement(&session, Tick(20), &configs).unwrap();

        // dropping the leave keeps slot 1 accruing; the yield matches that
        // history but the chain head does not
        let mut truncated = configs.clone();
        truncated[1].pop();
        let mut forged = statement.clone();
        forged.yields[1] = 6 * 20;
        let circuit =
            YieldCircuit::new(CircuitShape::new(2, 2), &session, forged, &truncated).unwrap();
        assert!(!satisfied(circuit));
    }

    #[test]
    fn params_of_another_shape_are_unsatisfiable() {
        let session = played_session();
        let configs = session.log().configs();
        let mut statement = prepare_statement(&session, Tick(20), &configs).unwrap();
        statement.params = Session::new(SessionConfig::harvest(100, 3)).params_digest();
        let circuit = YieldCircuit::new(CircuitShape::new(2, 2), &session, statement, &configs)
            .unwrap();
        assert!(!satisfied(circuit));
    }

    #[test]
    fn logs_longer_than_the_shape_are_refused() {
        let session = played_session();
        let configs = session.log().configs();
        let statement = prepare_statement(&session, Tick(20), &configs).unwrap();
        let err = YieldCircuit::new(CircuitShape::new(2, 1), &session, statement, &configs)
            .unwrap_err();
        assert!(matches!(err, ProofError::ShapeMismatch { configs: 2, .. }));
    }

    #[test]
    fn dungeon_sessions_are_refused() {
        let spec = DungeonSpec::uniform(0, 0, 3, 0, 0);
        let mut session = Session::new(SessionConfig::dungeon(40, spec));
        session.join(0, SeekerId(1), SlotId(0), &Fixed).unwrap();
        let configs = session.log().configs();
        let statement = prepare_statement(&session, Tick(5), &configs).unwrap();
        let shape = CircuitShape::new(session.slots().len(), 2);
        let err = YieldCircuit::new(shape, &session, statement, &configs).unwrap_err();
        assert!(matches!(err, ProofError::UnsupportedVariant));
    }

    #[test]
    fn public_inputs_follow_the_allocation_order() {
        let session = played_session();
        let configs = session.log().configs();
        let statement = prepare_statement(&session, Tick(20), &configs).unwrap();
        let shape = CircuitShape::new(2, 2);
        let inputs = public_inputs(shape, &statement).unwrap();
        assert_eq!(inputs.len(), shape.public_input_len());
        assert_eq!(inputs[0], Fr::from(20u64));
        assert_eq!(inputs[1..3], [Fr::from(50u64), Fr::from(60u64)]);

        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit_for(&session, 20, shape)
            .generate_constraints(cs.clone())
            .unwrap();
        assert_eq!(cs.num_instance_variables(), 1 + inputs.len());

        let err = public_inputs(CircuitShape::new(3, 2), &statement).unwrap_err();
        assert!(matches!(err, ProofError::SlotCount { expected: 3, actual: 2 }));
    }
}
