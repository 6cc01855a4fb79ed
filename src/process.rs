// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! External test-server process wrapper
//!
//! Keeps one server process alive across tests: `ensure_running` reaps a
//! dead child and respawns it, `stop_and_wait` asks politely first and
//! kills after a short grace period. All operations share one lock.

use std::io;
use std::process::{Child, Command};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

const STOP_GRACE: Duration = Duration::from_millis(200);

type BuildCommand = Box<dyn Fn() -> Command + Send + Sync>;
type SoftStop = Box<dyn Fn(&mut Child) + Send + Sync>;

/// Wrapper around an external server process under test.
pub struct ExternalServer {
    build: BuildCommand,
    soft_stop: Option<SoftStop>,
    child: Mutex<Option<Child>>,
}

impl ExternalServer {
    /// Create a wrapper; `build` produces the command to spawn.
    pub fn new(build: impl Fn() -> Command + Send + Sync + 'static) -> Self {
        Self {
            build: Box::new(build),
            soft_stop: None,
            child: Mutex::new(None),
        }
    }

    /// Install a closure that knows how to ask the process to stop
    /// before it gets killed.
    pub fn with_soft_stop(mut self, soft_stop: impl Fn(&mut Child) + Send + Sync + 'static) -> Self {
        self.soft_stop = Some(Box::new(soft_stop));
        self
    }

    /// Ensure the process is running, respawning it when it has exited.
    pub fn ensure_running(&self) -> io::Result<()> {
        let mut guard = self.child.lock();
        if let Some(child) = guard.as_mut() {
            if child.try_wait()?.is_some() {
                *guard = None;
            }
        }
        if guard.is_none() {
            let child = (self.build)().spawn()?;
            tracing::debug!(pid = child.id(), "external server started");
            *guard = Some(child);
        }
        Ok(())
    }

    /// Whether the process is currently running.
    pub fn is_running(&self) -> bool {
        let mut guard = self.child.lock();
        match guard.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Stop the process and wait for it to exit. Safe to call when
    /// nothing is running.
    pub fn stop_and_wait(&self) -> io::Result<()> {
        let mut guard = self.child.lock();
        if let Some(mut child) = guard.take() {
            if child.try_wait()?.is_none() {
                if let Some(soft_stop) = &self.soft_stop {
                    soft_stop(&mut child);
                }
                let deadline = Instant::now() + STOP_GRACE;
                while child.try_wait()?.is_none() && Instant::now() < deadline {
                    thread::sleep(Duration::from_millis(10));
                }
                if child.try_wait()?.is_none() {
                    tracing::debug!(pid = child.id(), "killing external server");
                    child.kill()?;
                }
            }
            child.wait()?;
        }
        Ok(())
    }
}
