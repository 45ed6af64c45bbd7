use std::time::{Duration, Instant};

/// One measured pipeline stage
#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub duration: Duration,
}

/// Stage durations of one pipeline run, in execution order.
#[derive(Debug, Default)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        self.steps.push(StepTiming {
            name: name.into(),
            duration,
        });
    }

    /// Runs `f` and records how long it took under `name`.
    pub fn measure<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        self.add_step(name, start.elapsed());
        value
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Summed duration of every step called `name`, if any ran.
    pub fn get_step(&self, name: &str) -> Option<Duration> {
        let mut matching = self.steps.iter().filter(|s| s.name == name).peekable();
        matching.peek()?;
        Some(matching.map(|s| s.duration).sum())
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// Per-stage table with each stage's share of the total.
    pub fn summary(&self) -> String {
        let total = self.total_duration().as_secs_f64();
        let share = |d: Duration| if total > 0.0 { d.as_secs_f64() / total * 100.0 } else { 0.0 };

        let mut out = format!("{:<24} {:>12} {:>8}\n", "Stage", "ms", "%");
        for step in &self.steps {
            out.push_str(&format!(
                "{:<24} {:>12.3} {:>7.1}%\n",
                step.name,
                step.duration.as_secs_f64() * 1000.0,
                share(step.duration)
            ));
        }
        out.push_str(&format!("{:<24} {:>12.3}", "Total", total * 1000.0));
        out
    }

    pub fn print_summary(&self) {
        println!("\n{}", self.summary());
    }
}
