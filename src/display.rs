//! Display output and quit control.
//!
//! `HeadlessDisplay` shows nothing and quits when its shared stop flag is
//! raised (the binary wires that flag to Ctrl-C). `MinifbDisplay` opens a
//! window and quits on `q` or when the window is closed.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::frame::Frame;

/// Delay between key polls while the window is up.
pub const KEY_POLL: Duration = Duration::from_millis(10);

pub trait Display {
    fn show(&mut self, frame: &Frame, title: &str) -> Result<()>;

    /// True once the user asked the loop to stop.
    fn quit_requested(&mut self) -> bool;

    fn close(&mut self) {}
}

pub struct HeadlessDisplay {
    stop: Arc<AtomicBool>,
}

impl HeadlessDisplay {
    pub fn new(stop: Arc<AtomicBool>) -> Self {
        Self { stop }
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, _frame: &Frame, _title: &str) -> Result<()> {
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Tracks whether the window was refreshed since the last quit check. Window
/// input is only processed on refresh, so a tick without a frame must pump
/// events itself.
#[derive(Debug, Default)]
#[cfg_attr(not(feature = "display-minifb"), allow(dead_code))]
pub(crate) struct InputPoll {
    refreshed: bool,
}

#[cfg_attr(not(feature = "display-minifb"), allow(dead_code))]
impl InputPoll {
    pub(crate) fn frame_shown(&mut self) {
        self.refreshed = true;
    }

    /// True when the caller must pump window events before reading input.
    pub(crate) fn needs_update(&mut self) -> bool {
        !std::mem::replace(&mut self.refreshed, false)
    }
}

#[cfg(feature = "display-minifb")]
pub use window::MinifbDisplay;

#[cfg(feature = "display-minifb")]
mod window {
    use anyhow::{anyhow, Result};
    use minifb::{Key, Window, WindowOptions};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::{Display, InputPoll, KEY_POLL};
    use crate::frame::Frame;
    use crate::overlay::WINDOW_TITLE;

    pub struct MinifbDisplay {
        window: Option<Window>,
        stop: Arc<AtomicBool>,
        size: (usize, usize),
        title: String,
        input: InputPoll,
    }

    impl MinifbDisplay {
        /// The window is created lazily on the first frame, sized to it.
        pub fn new(stop: Arc<AtomicBool>) -> Self {
            Self {
                window: None,
                stop,
                size: (0, 0),
                title: WINDOW_TITLE.to_string(),
                input: InputPoll::default(),
            }
        }

        fn open(&mut self, width: usize, height: usize) -> Result<()> {
            let mut window = Window::new(WINDOW_TITLE, width, height, WindowOptions::default())
                .map_err(|e| anyhow!("open display window: {}", e))?;
            window.set_target_fps((1000 / KEY_POLL.as_millis().max(1)) as usize);
            self.size = (width, height);
            self.window = Some(window);
            Ok(())
        }
    }

    impl Display for MinifbDisplay {
        fn show(&mut self, frame: &Frame, title: &str) -> Result<()> {
            let (width, height) = (frame.width() as usize, frame.height() as usize);
            if self.window.is_some() && self.size != (width, height) {
                log::warn!(
                    "Frame dimension change: {}x{} -> {}x{}, reopening window",
                    self.size.0,
                    self.size.1,
                    width,
                    height
                );
                self.window = None;
            }
            if self.window.is_none() {
                self.open(width, height)?;
            }
            let Some(window) = self.window.as_mut() else {
                return Ok(());
            };
            if title != self.title {
                window.set_title(title);
                self.title = title.to_string();
            }
            window
                .update_with_buffer(&frame.to_argb(), width, height)
                .map_err(|e| anyhow!("update display window: {}", e))?;
            self.input.frame_shown();
            Ok(())
        }

        fn quit_requested(&mut self) -> bool {
            if self.stop.load(Ordering::SeqCst) {
                return true;
            }
            let needs_update = self.input.needs_update();
            match self.window.as_mut() {
                Some(window) => {
                    if needs_update {
                        window.update();
                    }
                    !window.is_open() || window.is_key_down(Key::Q)
                }
                None => false,
            }
        }

        fn close(&mut self) {
            self.window = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_follows_stop_flag() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut display = HeadlessDisplay::new(stop.clone());
        display
            .show(&Frame::filled(2, 2, [0, 0, 0]), "t")
            .expect("show");
        assert!(!display.quit_requested());
        stop.store(true, Ordering::SeqCst);
        assert!(display.quit_requested());
    }

    #[test]
    fn input_is_pumped_only_on_ticks_without_a_frame() {
        let mut poll = InputPoll::default();
        assert!(poll.needs_update());

        poll.frame_shown();
        assert!(!poll.needs_update());
        // next tick had no frame
        assert!(poll.needs_update());
        assert!(poll.needs_update());

        poll.frame_shown();
        assert!(!poll.needs_update());
    }
}
