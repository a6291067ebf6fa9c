//! Cooperative task scheduler
//!
//! Each control loop is a task that runs until its next suspension point and
//! reports how long it wants to sleep. The scheduler keeps a simulated clock
//! in milliseconds and resumes due tasks in wake order. Nothing runs in
//! parallel: a task body executes atomically with respect to the others.

use crate::coordinator::ControlContext;
use crate::world::AgentWorld;

/// Result of resuming a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskPoll {
    /// Resume after this many milliseconds
    Sleep(u64),
    Done,
}

/// A resumable control loop
pub(crate) trait ControlTask: Send {
    fn name(&self) -> &'static str;

    /// Run until the next suspension point
    fn poll(&mut self, ctx: &mut ControlContext, world: &mut dyn AgentWorld) -> TaskPoll;
}

struct Scheduled {
    wake_at: u64,
    seq: u64,
    task: Box<dyn ControlTask>,
}

#[derive(Default)]
pub(crate) struct Scheduler {
    tasks: Vec<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    fn push(&mut self, wake_at: u64, task: Box<dyn ControlTask>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Scheduled { wake_at, seq, task });
    }

    /// Queue tasks spawned since the last call, due immediately
    fn adopt_spawned(&mut self, ctx: &mut ControlContext) {
        for task in ctx.take_spawned() {
            log::trace!("[Controls] Scheduling {} at {}ms", task.name(), ctx.now_ms);
            self.push(ctx.now_ms, task);
        }
    }

    fn next_due(&self, until_ms: u64) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.wake_at <= until_ms)
            .min_by_key(|(_, entry)| (entry.wake_at, entry.seq))
            .map(|(index, _)| index)
    }

    /// Advance the clock to `until_ms`, resuming every task that falls due
    /// on the way, including tasks spawned during this call.
    pub fn run_until(&mut self, ctx: &mut ControlContext, world: &mut dyn AgentWorld, until_ms: u64) {
        self.adopt_spawned(ctx);

        while let Some(index) = self.next_due(until_ms) {
            let mut entry = self.tasks.swap_remove(index);
            ctx.now_ms = ctx.now_ms.max(entry.wake_at);

            match entry.task.poll(ctx, world) {
                // A zero sleep would never let the clock move
                TaskPoll::Sleep(ms) => self.push(ctx.now_ms + ms.max(1), entry.task),
                TaskPoll::Done => {
                    log::trace!("[Controls] {} finished at {}ms", entry.task.name(), ctx.now_ms);
                }
            }

            self.adopt_spawned(ctx);
        }

        ctx.now_ms = ctx.now_ms.max(until_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlsConfig;
    use crate::sim::KinematicWorld;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counter {
        polls: Arc<AtomicUsize>,
        remaining: u32,
        period: u64,
    }

    impl ControlTask for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn poll(&mut self, _ctx: &mut ControlContext, _world: &mut dyn AgentWorld) -> TaskPoll {
            self.polls.fetch_add(1, Ordering::SeqCst);
            if self.remaining == 0 {
                return TaskPoll::Done;
            }
            self.remaining -= 1;
            TaskPoll::Sleep(self.period)
        }
    }

    #[test]
    fn test_tasks_resume_on_schedule() {
        let mut ctx = ControlContext::new(ControlsConfig::default().with_seed(3));
        let mut world = KinematicWorld::new();
        let mut scheduler = Scheduler::new();
        let polls = Arc::new(AtomicUsize::new(0));

        ctx.spawn(Box::new(Counter {
            polls: polls.clone(),
            remaining: 3,
            period: 100,
        }));

        // Polls at 0 and 100
        scheduler.run_until(&mut ctx, &mut world, 150);
        assert_eq!(polls.load(Ordering::SeqCst), 2);
        assert_eq!(ctx.now_ms, 150);
        assert_eq!(scheduler.len(), 1);

        // Polls at 200 and 300, the last one finishes
        scheduler.run_until(&mut ctx, &mut world, 1000);
        assert_eq!(polls.load(Ordering::SeqCst), 4);
        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn test_zero_sleep_advances_clock() {
        let mut ctx = ControlContext::new(ControlsConfig::default().with_seed(3));
        let mut world = KinematicWorld::new();
        let mut scheduler = Scheduler::new();
        let polls = Arc::new(AtomicUsize::new(0));

        ctx.spawn(Box::new(Counter {
            polls: polls.clone(),
            remaining: u32::MAX,
            period: 0,
        }));

        scheduler.run_until(&mut ctx, &mut world, 9);
        assert_eq!(polls.load(Ordering::SeqCst), 10);
    }
}
