use std::cell::{Cell, RefCell};
use std::io::Write;

use forecast_core::{ForecastDay, ForecastDelegate, Task};
use tracing::{debug, info, warn};

pub const HELP_TEXT: &str = "\
Each card is one day of forecast: date, icon, and conditions.
Pick a day to see its details, or Quit to leave.";

/// Owns navigation for the forecast screen and writes what the user asked for.
pub struct Coordinator<W: Write> {
    out: RefCell<W>,
    task: Cell<Task>,
}

impl<W: Write> Coordinator<W> {
    pub fn new(out: W) -> Self {
        Self { out: RefCell::new(out), task: Cell::new(Task::Startup) }
    }

    pub fn task(&self) -> Task {
        self.task.get()
    }

    /// Move to `next` if the current task allows it.
    pub fn switch_to(&self, next: Task) -> bool {
        let current = self.task.get();
        if !current.can_switch_to(next) {
            debug!(%current, %next, "task switch refused");
            return false;
        }
        info!(from = %current, to = %next, "task switched");
        self.task.set(next);
        true
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn emit(&self, text: &str) {
        if let Err(err) = writeln!(self.out.borrow_mut(), "{text}") {
            warn!(error = %err, "failed to write output");
        }
    }
}

impl<W: Write> ForecastDelegate for Coordinator<W> {
    fn details_requested(&self, day: &ForecastDay) {
        self.emit(&format!(
            "{}: {} (icon: {})",
            day.date.format("%A, %B %-d %Y"),
            day.conditions.displayable(),
            day.icon_name
        ));
    }

    fn help_requested(&self) {
        let previous = self.task.get();
        self.switch_to(Task::Help);
        self.emit(HELP_TEXT);
        if previous != Task::Startup {
            self.switch_to(previous);
        }
    }
}
