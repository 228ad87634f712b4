use std::sync::mpsc::{self, Receiver, RecvError, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app loop. Ticks drive the
/// countdown at one-second granularity; a bracketed paste arrives as a
/// single multi-character event, which is exactly the shape the burst
/// policy wants to see.
#[derive(Clone, Debug)]
pub enum DrillEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    Tick,
}

/// Merged stream of terminal input and countdown ticks. One tick is
/// outstanding at a time; producers stop as soon as the consumer hangs
/// up.
pub struct Events {
    rx: Receiver<DrillEvent>,
}

impl Events {
    /// Production stream: one thread reads crossterm events, another
    /// emits `Tick` every `tick_every`.
    pub fn terminal(tick_every: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        let tick_tx = tx.clone();
        thread::spawn(move || loop {
            thread::sleep(tick_every);
            if tick_tx.send(DrillEvent::Tick).is_err() {
                break;
            }
        });

        thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => Some(DrillEvent::Key(key)),
                Ok(CtEvent::Paste(text)) => Some(DrillEvent::Paste(text)),
                Ok(CtEvent::Resize(_, _)) => Some(DrillEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };

            if let Some(evt) = evt {
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Test stream: the caller injects events (ticks included) by hand.
    pub fn manual() -> (Self, Sender<DrillEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { rx }, tx)
    }

    /// Block for the next event. `Err` means every producer is gone.
    pub fn next(&self) -> Result<DrillEvent, RecvError> {
        self.rx.recv()
    }
}
