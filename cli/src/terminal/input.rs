use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use hostmap_core::ProgressMonitor;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Default)]
struct Flags {
    status: AtomicBool,
    interrupt: AtomicBool,
    closed: AtomicBool,
}

/// Watches the terminal on a background thread.
///
/// The terminal stays in cooked mode, so keys arrive once Enter is pressed:
/// a bare Enter asks for a status line, `q` then Enter asks to stop.
pub struct KeyboardMonitor {
    flags: Arc<Flags>,
}

impl KeyboardMonitor {
    /// `None` when stdin is not a terminal.
    pub fn start() -> Option<Self> {
        if !std::io::stdin().is_terminal() {
            debug!("stdin is not a terminal, keyboard input disabled");
            return None;
        }

        let flags = Arc::new(Flags::default());
        let listener = flags.clone();
        thread::spawn(move || listen(&listener));
        Some(Self { flags })
    }
}

fn listen(flags: &Flags) {
    let mut quit_pending = false;

    while !flags.closed.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                debug!("keyboard input unavailable: {e}");
                break;
            }
        }

        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q' | 'Q') => quit_pending = true,
            KeyCode::Enter if quit_pending => {
                flags.interrupt.store(true, Ordering::SeqCst);
                quit_pending = false;
            }
            KeyCode::Enter => flags.status.store(true, Ordering::SeqCst),
            _ => quit_pending = false,
        }
    }
}

impl ProgressMonitor for KeyboardMonitor {
    fn poll(&self) -> bool {
        self.flags.status.swap(false, Ordering::SeqCst)
    }

    fn interrupted(&self) -> bool {
        self.flags.interrupt.load(Ordering::SeqCst)
    }
}

impl Drop for KeyboardMonitor {
    fn drop(&mut self) {
        self.flags.closed.store(true, Ordering::Relaxed);
    }
}
