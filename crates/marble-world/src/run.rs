//! Run timing, collectible tracking and medal evaluation.

use std::collections::BTreeSet;
use std::fmt;

use crate::level::LevelMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl Medal {
    pub const ALL: [Medal; 4] = [Self::Bronze, Self::Silver, Self::Gold, Self::Diamond];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Diamond => "Diamond",
        }
    }

    fn threshold(self, metadata: &LevelMetadata) -> f32 {
        match self {
            Self::Bronze => metadata.bronze_time,
            Self::Silver => metadata.silver_time,
            Self::Gold => metadata.gold_time,
            Self::Diamond => metadata.diamond_time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MedalResult {
    pub medal: Medal,
    /// `None` when the level leaves this medal unset.
    pub threshold: Option<f32>,
    pub achieved: bool,
}

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub level_name: String,
    pub time: f32,
    pub medals: Vec<MedalResult>,
}

impl RunSummary {
    /// Compares `time` against every threshold independently; order between
    /// thresholds does not matter.
    pub fn evaluate(time: f32, metadata: &LevelMetadata) -> Self {
        let medals = Medal::ALL
            .into_iter()
            .map(|medal| {
                let threshold = Some(medal.threshold(metadata)).filter(|t| *t >= 0.0);
                MedalResult {
                    medal,
                    threshold,
                    achieved: threshold.is_some_and(|t| time <= t),
                }
            })
            .collect();

        Self {
            level_name: metadata.name.clone(),
            time,
            medals,
        }
    }

    pub fn achieved(&self, medal: Medal) -> bool {
        self.medals
            .iter()
            .any(|result| result.medal == medal && result.achieved)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} finished in {:.2}s", self.level_name, self.time)?;
        for result in &self.medals {
            match result.threshold {
                Some(threshold) => write!(
                    f,
                    " | {} {:.2}s {}",
                    result.medal.name(),
                    threshold,
                    if result.achieved { "yes" } else { "no" }
                )?,
                None => write!(f, " | {} -", result.medal.name())?,
            }
        }
        Ok(())
    }
}

/// Progress of the current Play session.
#[derive(Debug, Clone, Default)]
pub struct RunTracker {
    elapsed: f32,
    collected: BTreeSet<u32>,
    total: usize,
    finished: bool,
}

impl RunTracker {
    /// Starts a fresh run over `total` collectibles.
    pub fn reset(&mut self, total: usize) {
        self.elapsed = 0.0;
        self.collected.clear();
        self.total = total;
        self.finished = false;
    }

    /// Advances the clock unless the run is over.
    pub fn tick(&mut self, dt: f32) {
        if !self.finished {
            self.elapsed += dt;
        }
    }

    /// Records a collectible. Returns `false` if it was already counted or the
    /// run is over.
    pub fn collect(&mut self, index: u32) -> bool {
        !self.finished && self.collected.insert(index)
    }

    pub fn all_collected(&self) -> bool {
        self.collected.len() >= self.total
    }

    /// Marks the run finished. Only the first call yields a summary.
    pub fn finish(&mut self, metadata: &LevelMetadata) -> Option<RunSummary> {
        if self.finished || !self.all_collected() {
            return None;
        }
        self.finished = true;
        Some(RunSummary::evaluate(self.elapsed, metadata))
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn collected(&self) -> usize {
        self.collected.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn hud_text(&self) -> String {
        format!(
            "Time: {:.2}s | Collectibles: {}/{}",
            self.elapsed,
            self.collected.len(),
            self.total
        )
    }
}
