//! Writes a synthetic `region.csv` and `result.csv` in the speed-test tool's
//! layout so the panel can be tried without running the tool.
//!
//! Usage: `generate_sample [output-dir]`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const HEADER: [&str; 7] = [
    "IP 地址",
    "已发送",
    "已接收",
    "丢包率",
    "平均延迟",
    "下载速度 (MB/s)",
    "地区码",
];

/// Colo code and relative weight in the discovery output.
const COLOS: [(&str, u32); 8] = [
    ("LAX", 30),
    ("SJC", 22),
    ("HKG", 14),
    ("NRT", 12),
    ("SIN", 9),
    ("FRA", 6),
    ("SEA", 4),
    ("QQQ", 3),
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

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

fn pick_colo(rng: &mut SimpleRng) -> &'static str {
    let total: u32 = COLOS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.below(total as u64) as u32;
    for (code, weight) in COLOS {
        if roll < weight {
            return code;
        }
        roll -= weight;
    }
    COLOS[0].0
}

fn random_ip(rng: &mut SimpleRng) -> String {
    let prefixes = [[104, 16], [104, 17], [172, 64], [162, 159]];
    let [a, b] = prefixes[rng.below(prefixes.len() as u64) as usize];
    format!("{a}.{b}.{}.{}", rng.below(256), 1 + rng.below(254))
}

fn write_rows(path: &Path, rows: &[[String; 7]]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn measurement(rng: &mut SimpleRng, ip: String, colo: &str, with_speed: bool) -> [String; 7] {
    let latency = 120.0 + rng.next_f64() * 180.0;
    let speed = if with_speed { rng.next_f64() * 25.0 } else { 0.0 };
    [
        ip,
        "4".to_string(),
        "4".to_string(),
        "0.00".to_string(),
        format!("{latency:.2}"),
        format!("{speed:.2}"),
        colo.to_string(),
    ]
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut rng = SimpleRng::new(42);

    let discovery: Vec<[String; 7]> = (0..240)
        .map(|_| {
            let ip = random_ip(&mut rng);
            let colo = pick_colo(&mut rng);
            measurement(&mut rng, ip, colo, false)
        })
        .collect();
    let region_csv = out_dir.join("region.csv");
    write_rows(&region_csv, &discovery)?;

    let results: Vec<[String; 7]> = discovery
        .iter()
        .filter(|row| row[6] == "LAX")
        .take(20)
        .map(|row| measurement(&mut rng, row[0].clone(), "LAX", true))
        .collect();
    let result_csv = out_dir.join("result.csv");
    write_rows(&result_csv, &results)?;

    println!(
        "Wrote {} discovery rows to {} and {} results to {}",
        discovery.len(),
        region_csv.display(),
        results.len(),
        result_csv.display()
    );
    Ok(())
}
