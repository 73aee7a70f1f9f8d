//! Canonical gate sequences.
//!
//! Each function appends a fixed, ordered list of gates to the supplied
//! circuit. Parameters are validated before the first append, so a failing
//! call leaves the circuit untouched.

use ddgrover_ir::{Circuit, IrError, IrResult, QubitId, target_bits};

/// Qubit pair carrying the phase flip in both oracle and diffusion.
///
/// Control is qubit 0 and target is the last qubit, which is `(q0, q1)` for
/// the two-qubit search.
pub fn canonical_pair(num_qubits: u32) -> IrResult<(QubitId, QubitId)> {
    if num_qubits < 2 {
        return Err(IrError::TooFewQubits {
            sequence: "phase flip",
            required: 2,
            got: num_qubits,
        });
    }
    Ok((QubitId(0), QubitId(num_qubits - 1)))
}

/// Qubits bracketed by `PauliX` in the oracle: those whose target bit is 0.
pub fn oracle_flip_qubits(target: u64, num_qubits: u32) -> IrResult<Vec<QubitId>> {
    let bits = target_bits(target, num_qubits)?;
    Ok(bits
        .iter()
        .enumerate()
        .filter(|&(_, &bit)| !bit)
        .map(|(i, _)| QubitId(i as u32))
        .collect())
}

/// Number of gates one decoupling block adds to an `num_qubits` register.
pub fn decoupling_len(num_qubits: u32) -> usize {
    2 * num_qubits as usize
}

/// Number of gates the oracle emits for `target`.
pub fn oracle_len(target: u64, num_qubits: u32) -> IrResult<usize> {
    Ok(2 * oracle_flip_qubits(target, num_qubits)?.len() + 1)
}

/// Number of gates the diffusion operator emits.
pub fn diffusion_len(num_qubits: u32) -> usize {
    4 * num_qubits as usize + 1
}

fn check_width(circuit: &Circuit, num_qubits: u32) -> IrResult<()> {
    if circuit.num_qubits() != num_qubits {
        return Err(IrError::QubitCountMismatch {
            expected: num_qubits,
            got: circuit.num_qubits(),
        });
    }
    Ok(())
}

fn hadamard_layer(circuit: &mut Circuit) -> IrResult<()> {
    for q in circuit.qubits() {
        circuit.h(q)?;
    }
    Ok(())
}

fn x_layer(circuit: &mut Circuit) -> IrResult<()> {
    for q in circuit.qubits() {
        circuit.x(q)?;
    }
    Ok(())
}

/// Uniform superposition: one Hadamard per qubit, ascending.
pub fn apply_superposition(circuit: &mut Circuit) -> IrResult<()> {
    hadamard_layer(circuit)
}

/// XX decoupling: two consecutive `PauliX` on each qubit, ascending.
///
/// The block is logically the identity. It exists for its physical timing
/// and must reach the backend as emitted.
pub fn apply_decoupling(circuit: &mut Circuit) -> IrResult<()> {
    for q in circuit.qubits() {
        circuit.x(q)?;
        circuit.x(q)?;
    }
    Ok(())
}

/// Phase oracle marking `target`.
///
/// Zero bits of the MSB-first representation get a `PauliX` before and after
/// the `ControlledZ`, mapping the marked state onto all-ones for the flip.
pub fn apply_oracle(circuit: &mut Circuit, target: u64, num_qubits: u32) -> IrResult<()> {
    check_width(circuit, num_qubits)?;
    let (control, flip_target) = canonical_pair(num_qubits)?;
    let flips = oracle_flip_qubits(target, num_qubits)?;

    for &q in &flips {
        circuit.x(q)?;
    }
    circuit.cz(control, flip_target)?;
    for &q in &flips {
        circuit.x(q)?;
    }
    Ok(())
}

/// Inversion about the mean: H, X, CZ, X, H over the whole register.
pub fn apply_diffusion(circuit: &mut Circuit, num_qubits: u32) -> IrResult<()> {
    check_width(circuit, num_qubits)?;
    let (control, target) = canonical_pair(num_qubits)?;

    hadamard_layer(circuit)?;
    x_layer(circuit)?;
    circuit.cz(control, target)?;
    x_layer(circuit)?;
    hadamard_layer(circuit)
}
