//! Variant assembly.
//!
//! Composes the canonical sequences in a fixed order:
//!
//! ```text
//!   superposition ─→ [DD: pre_oracle] ─→ (oracle ─→ diffusion ─→ [DD: between rounds])*
//!                                        ─→ [DD: post_diffusion]
//! ```
//!
//! Between-round decoupling only appears for hardened descriptors with more
//! than one iteration; it is never emitted after the final round.

use serde::Serialize;
use tracing::debug;

use ddgrover_ir::{Circuit, IrError, IrResult};

use crate::sequence::{
    apply_decoupling, apply_diffusion, apply_oracle, apply_superposition, decoupling_len,
    diffusion_len, oracle_len,
};
use crate::variant::{InsertionPoint, Variant, VariantDescriptor};

/// A finished circuit plus the metadata describing how it was built.
#[derive(Debug, Clone, Serialize)]
pub struct AssembledCircuit {
    /// The circuit, ready for submission.
    pub circuit: Circuit,
    /// Variant the descriptor resolved to.
    pub variant: Variant,
    /// Total number of operations.
    pub gate_count: usize,
    /// Insertion points that received a decoupling block, in circuit order.
    pub insertion_points: Vec<InsertionPoint>,
    /// Total decoupling blocks emitted, including between-round blocks.
    pub decoupling_blocks: usize,
}

/// Build the circuit for `descriptor`.
pub fn build(descriptor: &VariantDescriptor) -> IrResult<Circuit> {
    Assembler::assemble(descriptor).map(|assembled| assembled.circuit)
}

/// Stateless assembler for both algorithm variants.
pub struct Assembler;

impl Assembler {
    /// Build the circuit for `descriptor` and report what went into it.
    ///
    /// The output depends only on the descriptor.
    pub fn assemble(descriptor: &VariantDescriptor) -> IrResult<AssembledCircuit> {
        if descriptor.iterations == 0 {
            return Err(IrError::NoIterations);
        }
        let n = descriptor.qubit_count;
        let hardened = descriptor.variant() == Variant::Hardened;
        let mut circuit = Circuit::new(n)?;
        let mut blocks = 0;

        apply_superposition(&mut circuit)?;

        if descriptor.uses(InsertionPoint::PreOracle) {
            apply_decoupling(&mut circuit)?;
            blocks += 1;
        }

        for round in 0..descriptor.iterations {
            apply_oracle(&mut circuit, descriptor.target, n)?;
            apply_diffusion(&mut circuit, n)?;
            if hardened && round + 1 < descriptor.iterations {
                apply_decoupling(&mut circuit)?;
                blocks += 1;
            }
        }

        if descriptor.uses(InsertionPoint::PostDiffusion) {
            apply_decoupling(&mut circuit)?;
            blocks += 1;
        }

        let insertion_points: Vec<_> = InsertionPoint::ALL
            .into_iter()
            .filter(|p| descriptor.uses(*p))
            .collect();

        debug!(
            target_value = descriptor.target,
            qubits = n,
            variant = %descriptor.variant(),
            ops = circuit.num_ops(),
            decoupling_blocks = blocks,
            "assembled search circuit"
        );

        Ok(AssembledCircuit {
            gate_count: circuit.num_ops(),
            variant: descriptor.variant(),
            circuit,
            insertion_points,
            decoupling_blocks: blocks,
        })
    }

    /// Gate count `assemble` will produce, computed without building.
    pub fn expected_gate_count(descriptor: &VariantDescriptor) -> IrResult<usize> {
        if descriptor.iterations == 0 {
            return Err(IrError::NoIterations);
        }
        let n = descriptor.qubit_count;
        let rounds = descriptor.iterations as usize;
        let mut blocks = descriptor.insertion_points.len();
        if descriptor.variant() == Variant::Hardened {
            blocks += rounds - 1;
        }
        Ok(n as usize
            + rounds * (oracle_len(descriptor.target, n)? + diffusion_len(n))
            + blocks * decoupling_len(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddgrover_ir::{Gate, QubitId};
    use proptest::prelude::*;

    const BOTH: [InsertionPoint; 2] = InsertionPoint::ALL;

    #[test]
    fn test_standard_gate_counts_two_qubits() {
        // 2 H + oracle (1 CZ + 2 X per zero bit) + 9-gate diffusion
        let expected = [(0b00, 16), (0b01, 14), (0b10, 14), (0b11, 12)];
        for (target, count) in expected {
            let circuit = build(&VariantDescriptor::standard(target, 2)).unwrap();
            assert_eq!(circuit.num_ops(), count, "target {target:02b}");
        }
    }

    #[test]
    fn test_target_three_standard_circuit() {
        let circuit = build(&VariantDescriptor::standard(0b11, 2)).unwrap();
        let q0 = QubitId(0);
        let q1 = QubitId(1);
        assert_eq!(
            circuit.operations(),
            &[
                Gate::h(q0),
                Gate::h(q1),
                Gate::cz(q0, q1),
                Gate::h(q0),
                Gate::h(q1),
                Gate::x(q0),
                Gate::x(q1),
                Gate::cz(q0, q1),
                Gate::x(q0),
                Gate::x(q1),
                Gate::h(q0),
                Gate::h(q1),
            ]
        );
        assert_eq!(circuit.num_ops(), 12);
    }

    #[test]
    fn test_hardened_adds_four_gates_per_point() {
        for target in 0..4 {
            let standard = build(&VariantDescriptor::standard(target, 2)).unwrap();
            let pre = build(&VariantDescriptor::hardened(
                target,
                2,
                [InsertionPoint::PreOracle],
            ))
            .unwrap();
            let both = build(&VariantDescriptor::hardened(target, 2, BOTH)).unwrap();

            assert_eq!(pre.num_ops(), standard.num_ops() + 4);
            assert_eq!(both.num_ops(), standard.num_ops() + 8);
        }
    }

    #[test]
    fn test_hardened_layout() {
        let assembled =
            Assembler::assemble(&VariantDescriptor::hardened(0b11, 2, BOTH)).unwrap();
        let ops = assembled.circuit.operations();
        let dd = [
            Gate::x(QubitId(0)),
            Gate::x(QubitId(0)),
            Gate::x(QubitId(1)),
            Gate::x(QubitId(1)),
        ];

        assert_eq!(assembled.gate_count, 20);
        assert_eq!(assembled.variant, Variant::Hardened);
        assert_eq!(assembled.decoupling_blocks, 2);
        assert_eq!(assembled.insertion_points, BOTH.to_vec());
        // pre-oracle block right after the Hadamard layer
        assert_eq!(&ops[2..6], &dd);
        assert_eq!(ops[6], Gate::cz(QubitId(0), QubitId(1)));
        // post-diffusion block closes the circuit
        assert_eq!(&ops[16..20], &dd);
    }

    #[test]
    fn test_post_diffusion_only() {
        let assembled = Assembler::assemble(&VariantDescriptor::hardened(
            0b10,
            2,
            [InsertionPoint::PostDiffusion],
        ))
        .unwrap();
        assert_eq!(assembled.insertion_points, vec![InsertionPoint::PostDiffusion]);
        // H H, X cz X, diffusion: no X pairs before the oracle
        assert_eq!(assembled.circuit.operations()[2], Gate::x(QubitId(1)));
        assert_eq!(assembled.gate_count, 14 + 4);
    }

    #[test]
    fn test_between_round_decoupling_only_when_hardened() {
        let standard = Assembler::assemble(&VariantDescriptor::standard(1, 2).with_iterations(3))
            .unwrap();
        assert_eq!(standard.decoupling_blocks, 0);
        assert_eq!(standard.gate_count, 2 + 3 * (3 + 9));

        let hardened = Assembler::assemble(
            &VariantDescriptor::hardened(1, 2, [InsertionPoint::PreOracle]).with_iterations(3),
        )
        .unwrap();
        // one pre-oracle block plus two between-round blocks
        assert_eq!(hardened.decoupling_blocks, 3);
        assert_eq!(hardened.gate_count, standard.gate_count + 3 * 4);
    }

    #[test]
    fn test_invalid_descriptors() {
        assert!(matches!(
            build(&VariantDescriptor::standard(4, 2)),
            Err(IrError::TargetOutOfRange { .. })
        ));
        assert!(matches!(
            build(&VariantDescriptor::standard(0, 0)),
            Err(IrError::NoQubits)
        ));
        assert!(matches!(
            build(&VariantDescriptor::standard(0, 2).with_iterations(0)),
            Err(IrError::NoIterations)
        ));
    }

    #[test]
    fn test_build_is_deterministic() {
        let desc = VariantDescriptor::hardened(0b01, 2, BOTH);
        assert_eq!(build(&desc).unwrap(), build(&desc).unwrap());
    }

    proptest! {
        #[test]
        fn prop_build_is_deterministic(
            n in 2u32..6,
            seed in any::<u64>(),
            pre in any::<bool>(),
            post in any::<bool>(),
            iterations in 1u32..4,
        ) {
            let target = seed % (1u64 << n);
            let mut points = Vec::new();
            if pre { points.push(InsertionPoint::PreOracle); }
            if post { points.push(InsertionPoint::PostDiffusion); }
            let desc = VariantDescriptor::hardened(target, n, points).with_iterations(iterations);

            let first = build(&desc).unwrap();
            let second = build(&desc).unwrap();
            prop_assert_eq!(first.operations(), second.operations());
            prop_assert_eq!(first.num_ops(), Assembler::expected_gate_count(&desc).unwrap());
        }

        #[test]
        fn prop_overhead_independent_of_target(n in 2u32..6, a in any::<u64>(), b in any::<u64>()) {
            let (ta, tb) = (a % (1u64 << n), b % (1u64 << n));
            let overhead = |t: u64| {
                let hard = build(&VariantDescriptor::hardened(t, n, BOTH)).unwrap().num_ops();
                let std = build(&VariantDescriptor::standard(t, n)).unwrap().num_ops();
                hard - std
            };
            prop_assert_eq!(overhead(ta), overhead(tb));
            prop_assert_eq!(overhead(ta), 2 * decoupling_len(n));
        }
    }
}
