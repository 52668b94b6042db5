//! Multi-target progress tracking with automatic batching for large sets

use crate::algorithm::executor::{RunObserver, Stage};
use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;

/// Display state of one target
#[derive(Clone, Debug, Default)]
struct TargetState {
    name: String,
    stage: &'static str,
    current: usize,
    total: usize,
}

/// Progress bars for a batch of mosaic targets
///
/// Shows one bar per recent target and, for large batches, an overall
/// bar counting finished targets.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    target_bars: Vec<ProgressBar>,
    target_states: Vec<TargetState>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static TARGET_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let fallback = ProgressStyle::default_bar();
    ProgressStyle::with_template("{prefix:>24.bold} [{bar:30.green/white}] {msg}")
        .unwrap_or(fallback)
        .progress_chars("=> ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    let fallback = ProgressStyle::default_bar();
    ProgressStyle::with_template("{elapsed_precise:>24} [{bar:30.yellow/white}] {pos}/{len} targets")
        .unwrap_or(fallback)
});

impl ProgressManager {
    /// Manager with no bars yet
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            target_bars: Vec::new(),
            target_states: Vec::new(),
        }
    }

    /// Create bars for `target_count` targets
    pub fn initialize(&mut self, target_count: usize) {
        // Switch to batch mode for large target sets to avoid terminal spam
        if target_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch = ProgressBar::new(target_count as u64).with_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch));
        }

        for _ in 0..target_count.min(MAX_INDIVIDUAL_PROGRESS_BARS) {
            let pb = ProgressBar::new(0);
            pb.set_style(TARGET_STYLE.clone());
            self.target_bars.push(self.multi_progress.add(pb));
        }
    }

    /// Register a target and get the observer feeding its bar
    pub fn start_target(&mut self, index: usize, path: &Path) -> TargetProgress<'_> {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if index >= self.target_states.len() {
            self.target_states.resize(index + 1, TargetState::default());
        }
        if let Some(state) = self.target_states.get_mut(index) {
            *state = TargetState {
                name,
                stage: "loading",
                current: 0,
                total: 0,
            };
        }
        self.redraw();
        TargetProgress {
            manager: self,
            index,
        }
    }

    /// Mark a target as finished and advance the batch bar
    pub fn complete_target(&mut self, index: usize) {
        if let Some(batch) = &self.batch_bar {
            batch.inc(1);
        }
        if let Some(state) = self.target_states.get_mut(index) {
            state.name = format!("✓ {}", state.name);
            state.stage = "done";
            state.current = state.total;
        }
        self.redraw();
    }

    /// Finish the batch bar and clear the target bars
    pub fn finish(&self) {
        if let Some(batch) = &self.batch_bar {
            batch.finish();
        }
        if let Err(error) = self.multi_progress.clear() {
            log::debug!("could not clear progress bars: {error}");
        }
    }

    /// Progress line of a target: (stage, current, total)
    pub fn state(&self, index: usize) -> Option<(&'static str, usize, usize)> {
        self.target_states
            .get(index)
            .map(|state| (state.stage, state.current, state.total))
    }

    fn set_stage(&mut self, index: usize, stage: Stage) {
        if let Some(state) = self.target_states.get_mut(index) {
            let (label, total) = match stage {
                Stage::Normalizing { tiles } => ("normalizing", tiles),
                Stage::Gridding => ("gridding", 0),
                Stage::Solving { cells } => ("solving", cells),
                Stage::Rendering => ("rendering", state.total),
            };
            state.stage = label;
            state.total = total;
            if !matches!(stage, Stage::Rendering) {
                state.current = 0;
            }
        }
        self.redraw();
    }

    fn set_assigned(&mut self, index: usize, done: usize, total: usize) {
        if let Some(state) = self.target_states.get_mut(index) {
            state.current = done;
            state.total = total;
        }
        // Redrawing on every commit would dominate small runs
        if done == total || done % 64 == 0 {
            self.redraw();
        }
    }

    /// Show the most recently started targets on the available bars
    fn redraw(&self) {
        let active: Vec<&TargetState> = self
            .target_states
            .iter()
            .filter(|state| !state.name.is_empty())
            .collect();

        let start_idx = active.len().saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible = active.get(start_idx..).unwrap_or(&[]);

        for (bar_idx, state) in visible.iter().enumerate() {
            if let Some(bar) = self.target_bars.get(bar_idx) {
                bar.set_length(state.total as u64);
                bar.set_position(state.current as u64);
                let width = state.total.to_string().len();
                bar.set_message(format!(
                    "{:<11} {:>width$}/{}",
                    state.stage, state.current, state.total
                ));
                bar.set_prefix(state.name.clone());
            }
        }

        // Blank bars beyond the visible targets
        for bar_idx in visible.len()..self.target_bars.len() {
            if let Some(bar) = self.target_bars.get(bar_idx) {
                bar.set_length(0);
                bar.set_position(0);
                bar.set_message("");
                bar.set_prefix("");
            }
        }
    }
}

/// Pipeline observer bound to one target's bar
pub struct TargetProgress<'a> {
    manager: &'a mut ProgressManager,
    index: usize,
}

impl RunObserver for TargetProgress<'_> {
    fn stage(&mut self, stage: Stage) {
        self.manager.set_stage(self.index, stage);
    }

    fn assigned(&mut self, done: usize, total: usize) {
        self.manager.set_assigned(self.index, done, total);
    }
}
