//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use ddgrover_ir::Gate;

/// A statevector over `num_qubits` qubits.
///
/// Amplitude index bit `k` holds qubit `k`.
#[derive(Debug, Clone)]
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Apply one gate.
    pub fn apply(&mut self, gate: &Gate) {
        match *gate {
            Gate::Hadamard { qubit } => self.apply_h(qubit.index()),
            Gate::PauliX { qubit } => self.apply_x(qubit.index()),
            Gate::ControlledZ { control, target } => {
                self.apply_cz(control.index(), target.index());
            }
        }
    }

    /// Apply a gate, then with probability `p` flip one of its qubits.
    pub fn apply_noisy<R: Rng>(&mut self, gate: &Gate, p: f64, rng: &mut R) {
        self.apply(gate);
        if p > 0.0 && rng.gen_bool(p) {
            let qubits = gate.qubits();
            let victim = qubits[rng.gen_range(0..qubits.len())];
            self.apply_x(victim.index());
        }
    }

    pub(crate) fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let both = (1 << control) | (1 << target);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & both == both {
                *amp = -*amp;
            }
        }
    }

    /// Probability of amplitude index `index`.
    #[cfg(test)]
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitudes[index].norm_sqr()
    }

    /// Sample an amplitude index.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave the cumulative sum just below 1.
        self.amplitudes
            .iter()
            .rposition(|a| a.norm_sqr() > 0.0)
            .unwrap_or(0)
    }

    /// Register value of amplitude index `index`, qubit 0 most significant.
    pub fn register_value(&self, index: usize) -> u64 {
        (0..self.num_qubits).fold(0u64, |acc, k| (acc << 1) | ((index >> k) & 1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddgrover_ir::QubitId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!((1..4).all(|i| sv.probability(i) == 0.0));
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new(1);
        sv.apply(&Gate::h(QubitId(0)));
        assert!((sv.probability(0) - 0.5).abs() < 1e-12);
        assert!((sv.probability(1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cz_phase() {
        let mut sv = Statevector::new(2);
        sv.apply(&Gate::x(QubitId(0)));
        sv.apply(&Gate::x(QubitId(1)));
        sv.apply(&Gate::cz(QubitId(0), QubitId(1)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(-1.0, 0.0)));
    }

    #[test]
    fn test_xx_is_identity() {
        let mut sv = Statevector::new(2);
        sv.apply(&Gate::h(QubitId(0)));
        let before = sv.amplitudes.clone();
        sv.apply(&Gate::x(QubitId(1)));
        sv.apply(&Gate::x(QubitId(1)));
        assert!(before.iter().zip(&sv.amplitudes).all(|(a, b)| approx_eq(*a, *b)));
    }

    #[test]
    fn test_register_value_is_msb_first() {
        let sv = Statevector::new(2);
        // Index 0b01 has qubit 0 set, which is the leftmost register bit.
        assert_eq!(sv.register_value(0b01), 0b10);
        assert_eq!(sv.register_value(0b10), 0b01);
        assert_eq!(sv.register_value(0b11), 0b11);

        let sv = Statevector::new(3);
        assert_eq!(sv.register_value(0b001), 0b100);
        assert_eq!(sv.register_value(0b110), 0b011);
    }

    #[test]
    fn test_sample_deterministic() {
        let mut sv = Statevector::new(1);
        sv.apply(&Gate::x(QubitId(0)));
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(sv.sample(&mut rng), 1);
        }
    }

    #[test]
    fn test_certain_noise_flips() {
        let mut sv = Statevector::new(1);
        let mut rng = StdRng::seed_from_u64(3);
        sv.apply_noisy(&Gate::x(QubitId(0)), 1.0, &mut rng);
        assert_eq!(sv.sample(&mut rng), 0);
    }
}
