use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

/// CS rotational constant (cm⁻¹).
const B_CS: f64 = 0.8200;
const MAX_J: u32 = 40;

/// (v', v'', band origin cm⁻¹, Einstein A of the band)
const BANDS: [(u32, u32, f64, f64); 3] = [
    (1, 0, 1272.17, 9.5),
    (2, 1, 1261.26, 18.5),
    (0, 0, 0.0, 1.0e-6),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Fortran-style `E10.3` mantissa with a two-digit exponent, e.g. `4.567E-01`.
fn hitran_exp(value: f64) -> String {
    if value == 0.0 {
        return "0.000E+00".to_string();
    }
    let mut exp = value.abs().log10().floor() as i32;
    let mut mantissa = value / 10f64.powi(exp);
    if format!("{mantissa:.3}").starts_with("10.") {
        mantissa /= 10.0;
        exp += 1;
    }
    format!("{mantissa:.3}E{}{:02}", if exp < 0 { '-' } else { '+' }, exp.abs())
}

/// One synthetic CS record; token positions follow the built-in `CS/v_0` rule.
fn record(rng: &mut SimpleRng, v_up: u32, v_lo: u32, origin: f64, band_a: f64, branch: char, j_lo: u32) -> String {
    let j_up = if branch == 'R' { j_lo + 1 } else { j_lo - 1 };
    let m = if branch == 'R' { j_lo as f64 + 1.0 } else { -(j_lo as f64) };
    let wavenumber = origin + 2.0 * B_CS * m + rng.uniform(-0.01, 0.01);
    let lower_energy = B_CS * (j_lo * (j_lo + 1)) as f64 + 1285.0 * v_lo as f64;
    let einstein_a = band_a * (1.0 + 0.002 * m) * rng.uniform(0.98, 1.02);
    let intensity = 1e-18 * (-lower_energy / 207.0).exp() * rng.uniform(0.9, 1.1);
    let gamma_air = format!("{:.4}", rng.uniform(0.05, 0.09));
    let gamma_self = format!("{:.3}", rng.uniform(0.1, 0.2));
    let delta = rng.uniform(-0.003, 0.0);

    format!(
        " 461 {wavenumber:.6} {} {}{}{} {lower_energy:.4}0.75{delta:+.5} {v_up} {v_lo} {branch} {j_lo} 465542 5 8 2 2 {:.1} {:.1}",
        hitran_exp(intensity),
        hitran_exp(einstein_a),
        &gamma_air[1..],
        &gamma_self[1..],
        (2 * j_up + 1) as f64,
        (2 * j_lo + 1) as f64,
    )
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_CS.par".to_string());
    let mut rng = SimpleRng::new(42);

    let mut lines: Vec<(f64, String)> = Vec::new();
    for &(v_up, v_lo, origin, band_a) in &BANDS {
        for j_lo in 0..=MAX_J {
            let mut branches = vec!['R'];
            if j_lo > 0 {
                branches.push('P');
            }
            for branch in branches {
                let line = record(&mut rng, v_up, v_lo, origin, band_a, branch, j_lo);
                let wavenumber: f64 = line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|t| t.parse().ok())
                    .unwrap_or_default();
                if wavenumber > 0.0 {
                    lines.push((wavenumber, line));
                }
            }
        }
    }
    lines.sort_by(|a, b| a.0.total_cmp(&b.0));

    let file = File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut writer = BufWriter::new(file);
    for (_, line) in &lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;

    println!(
        "Wrote {} CS lines ({} bands) to {output_path}",
        lines.len(),
        BANDS.len()
    );
    Ok(())
}
