//! Optional timing of named regions.
//!
//! The hierarchy builder and the cycle engine bracket their phases with
//! [`Profiler::tic`] / [`Profiler::toc`]. Callers that do not care pass
//! [`NoProfiler`]; [`Profile`] accumulates wall-clock time per region and prints
//! a small report.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Receiver of timed-region events.
pub trait Profiler {
    /// Enter region `name`.
    fn tic(&mut self, name: &'static str);
    /// Leave region `name`.
    fn toc(&mut self, name: &'static str);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfiler;

impl Profiler for NoProfiler {
    #[inline]
    fn tic(&mut self, _name: &'static str) {}
    #[inline]
    fn toc(&mut self, _name: &'static str) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionStats {
    pub total: Duration,
    pub calls: usize,
}

/// Wall-clock time accumulated per region name.
#[derive(Debug, Default)]
pub struct Profile {
    open: Vec<(&'static str, Instant)>,
    regions: BTreeMap<&'static str, RegionStats>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, name: &str) -> Option<RegionStats> {
        self.regions.get(name).copied()
    }

    pub fn regions(&self) -> impl Iterator<Item = (&'static str, RegionStats)> + '_ {
        self.regions.iter().map(|(&name, &stats)| (name, stats))
    }
}

impl Profiler for Profile {
    fn tic(&mut self, name: &'static str) {
        self.open.push((name, Instant::now()));
    }

    fn toc(&mut self, name: &'static str) {
        // regions nest, so the matching tic is the innermost open one with this name
        if let Some(pos) = self.open.iter().rposition(|&(n, _)| n == name) {
            let (_, start) = self.open.remove(pos);
            let entry = self.regions.entry(name).or_default();
            entry.total += start.elapsed();
            entry.calls += 1;
        } else {
            log::warn!("profiler: toc(\"{name}\") without a matching tic");
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<20} {:>12} {:>8}", "region", "seconds", "calls")?;
        writeln!(f, "{}", "-".repeat(42))?;
        for (name, stats) in &self.regions {
            writeln!(f, "{:<20} {:>12.6} {:>8}", name, stats.total.as_secs_f64(), stats.calls)?;
        }
        Ok(())
    }
}
