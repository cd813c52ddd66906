//! particles — small ballistic particle simulation on top of `SoaVec`.
//!
//! Each particle is one record; its fields live in separate arrays, so the
//! per-step passes (gravity, drag, bounds) each touch only the arrays they
//! need.  Particles that hit the floor are removed with `retain`, and a new
//! burst is spliced in every few steps.
//!
//! `RUST_LOG=debug` also shows record registration.

use std::time::Instant;

use anyhow::{Context, Result, ensure};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use soa_vec::{SoaVec, soa_record};

// ── Constants ─────────────────────────────────────────────────────────────────

const PARTICLE_COUNT: usize = 2_000;
const BURST_SIZE:     usize = 250;
const BURST_EVERY:    u32   = 20;   // steps between bursts
const STEPS:          u32   = 200;
const SEED:           u64   = 42;
const DT:             f32   = 0.01; // seconds per step
const GRAVITY:        f32   = 9.81;
const DRAG:           f32   = 0.02;

// ── Particle record ───────────────────────────────────────────────────────────

soa_record! {
    #[derive(Clone, Debug, Default, PartialEq)]
    struct Particle {
        x:     f32,
        y:     f32,
        vx:    f32,
        vy:    f32,
        age:   u32,
        burst: u32,
    }
}

fn spawn(rng: &mut SmallRng, burst: u32) -> Particle {
    Particle {
        x:  rng.gen_range(-1.0..1.0),
        y:  rng.gen_range(0.0..0.5),
        vx: rng.gen_range(-2.0..2.0),
        vy: rng.gen_range(2.0..8.0),
        age: 0,
        burst,
    }
}

// ── Simulation passes ─────────────────────────────────────────────────────────

/// Column pass: gravity and drag only read and write velocities.
fn accelerate(particles: &mut SoaVec<Particle>) {
    for vx in particles.column_mut(Particle::vx) {
        *vx *= 1.0 - DRAG;
    }
    for vy in particles.column_mut(Particle::vy) {
        *vy = *vy * (1.0 - DRAG) - GRAVITY * DT;
    }
}

/// Proxy pass: positions need the matching velocities.
fn integrate(particles: &mut SoaVec<Particle>) {
    let mut cursor = particles.begin_mut();
    while !cursor.is_end() {
        let mut p = cursor.get_mut();
        let (vx, vy) = (*p.get(Particle::vx), *p.get(Particle::vy));
        *p.get_mut(Particle::x) += vx * DT;
        *p.get_mut(Particle::y) += vy * DT;
        *p.get_mut(Particle::age) += 1;
        cursor.advance();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_target(false))
        .init();

    println!("=== particles — soa-vec demo ===");
    println!("Particles: {PARTICLE_COUNT}  |  Steps: {STEPS}  |  Seed: {SEED}");
    println!();

    let mut rng = SmallRng::seed_from_u64(SEED);

    // 1. Build the initial cloud.
    let mut particles: SoaVec<Particle> = SoaVec::try_new().context("registering Particle")?;
    particles.try_reserve(PARTICLE_COUNT + BURST_SIZE)?;
    particles.extend((0..PARTICLE_COUNT).map(|_| spawn(&mut rng, 0)));
    tracing::info!(
        particles = particles.len(),
        fields = particles.fields().len(),
        capacity = particles.capacity(),
        "initial cloud built"
    );

    // 2. Run.
    let t0 = Instant::now();
    let mut removed = 0usize;
    for step in 1..=STEPS {
        accelerate(&mut particles);
        integrate(&mut particles);

        let before = particles.len();
        particles.retain(|p| *p.get(Particle::y) >= 0.0);
        removed += before - particles.len();

        if step % BURST_EVERY == 0 {
            let burst = step / BURST_EVERY;
            let fresh: Vec<Particle> = (0..BURST_SIZE).map(|_| spawn(&mut rng, burst)).collect();
            particles.insert_slice(0, &fresh);
            tracing::debug!(step, burst, live = particles.len(), "burst spliced in");
        }
    }
    let elapsed = t0.elapsed();

    ensure!(particles.store().is_lockstep(), "field arrays diverged");
    tracing::info!(live = particles.len(), removed, "simulation complete");

    // 3. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  live particles    : {}", particles.len());
    println!("  removed at floor  : {removed}");

    let heights = particles.field_array::<f32>("y")?;
    let mean_y = if heights.is_empty() { 0.0 } else { heights.iter().sum::<f32>() / heights.len() as f32 };
    println!("  mean height       : {mean_y:.3}");
    println!();

    // 4. Oldest particles, one line each.
    println!("{:<8} {:<8} {:>9} {:>9} {:>6}", "Index", "Burst", "x", "y", "Age");
    println!("{}", "-".repeat(44));
    for p in particles.iter().rev().take(5) {
        let Particle { x, y, age, burst, .. } = p.value();
        println!("{:<8} {:<8} {:>9.3} {:>9.3} {:>6}", p.index(), burst, x, y, age);
    }

    Ok(())
}
