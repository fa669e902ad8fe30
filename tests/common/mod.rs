//! Common test utilities

#![allow(dead_code)]

use cmdflag::{handler, Application, Capture, Command, ErrorPolicy, FlagSet, Handler};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Root command whose global flags write into a capture
pub fn capture_root(policy: ErrorPolicy) -> (Arc<Command>, Capture) {
    let capture = Capture::new();
    let globals = FlagSet::new("test", policy).with_output(capture.output());
    (Command::new(Some(globals)), capture)
}

/// Application whose handler bumps `counter` by `step` on every call
pub fn counting(name: &str, counter: &Arc<AtomicUsize>, step: usize) -> Application {
    let counter = Arc::clone(counter);
    Application::new(name)
        .policy(ErrorPolicy::Exit)
        .init(move |_| counter_handler(&counter, step))
}

fn counter_handler(counter: &Arc<AtomicUsize>, step: usize) -> Handler {
    let counter = Arc::clone(counter);
    handler(move |_| {
        counter.fetch_add(step, Ordering::SeqCst);
        Ok(0)
    })
}
