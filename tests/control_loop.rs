use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use std::thread;

use embedded_hal::digital::{ErrorType, OutputPin};
use pwm_speed_control::config::PwmConfig;
use pwm_speed_control::control::{
    EdgeSet, Echo, PendingEdges, Phase, PhaseToggler, SpeedIndex, SpeedSetter,
};
use pwm_speed_control::error::CommandError;
use pwm_speed_control::hardware::Countdown;

// --- Mock board: output level trace and armed countdowns ---
#[derive(Default)]
struct Board {
    levels: Vec<bool>,
    armed: Vec<u32>,
}

struct MockPin(Rc<RefCell<Board>>);
struct MockTimer(Rc<RefCell<Board>>);

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().levels.push(true);
        Ok(())
    }
}

impl Countdown for MockTimer {
    fn arm(&mut self, ticks: u32) {
        self.0.borrow_mut().armed.push(ticks);
    }
}

struct Rig {
    board: Rc<RefCell<Board>>,
    pin: MockPin,
    timer: MockTimer,
    toggler: PhaseToggler,
}

impl Rig {
    fn new() -> Self {
        let board = Rc::new(RefCell::new(Board::default()));
        Self {
            pin: MockPin(board.clone()),
            timer: MockTimer(board.clone()),
            board,
            toggler: PhaseToggler::new(PwmConfig::TM4C123, Phase::Low),
        }
    }

    fn fire(&mut self, speed: &SpeedIndex) -> u32 {
        match self.toggler.fire(&mut self.pin, &mut self.timer, speed) {
            Ok(ticks) => ticks,
            Err(e) => match e {},
        }
    }

    /// Run one full period (high then low) and return (high, low) ticks.
    fn period(&mut self, speed: &SpeedIndex) -> (u32, u32) {
        (self.fire(speed), self.fire(speed))
    }
}

fn speed() -> SpeedIndex {
    SpeedIndex::new(
        PwmConfig::TM4C123.default_index,
        PwmConfig::TM4C123.max_index,
    )
}

#[test]
fn default_speed_runs_symmetric_waveform() {
    let speed = speed();
    let mut rig = Rig::new();

    assert_eq!(rig.period(&speed), (40_000, 40_000));
    assert_eq!(rig.period(&speed), (40_000, 40_000));
    assert_eq!(rig.board.borrow().levels, [true, false, true, false]);
}

#[test]
fn buttons_reshape_waveform_from_next_toggle() {
    let speed = speed();
    let setter = SpeedSetter::new(&speed);
    let mut rig = Rig::new();

    for _ in 0..4 {
        setter.on_edges(EdgeSet::FASTER);
    }
    assert_eq!(speed.get(), 0);
    assert_eq!(rig.period(&speed), (72_000, 8_000));

    for _ in 0..9 {
        setter.on_edges(EdgeSet::SLOWER);
    }
    assert_eq!(speed.get(), 8);
    assert_eq!(rig.period(&speed), (8_000, 72_000));
}

#[test]
fn nine_slower_presses_stop_at_max() {
    let speed = speed();
    let setter = SpeedSetter::new(&speed);
    let echoes: Vec<Echo> = (0..9).map(|_| setter.on_edges(EdgeSet::SLOWER)).collect();

    let lines: Vec<u8> = echoes.iter().flat_map(|e| e.line()).collect();
    assert_eq!(lines, b"5\r\n6\r\n7\r\n8\r\n8\r\n8\r\n8\r\n8\r\n8\r\n");
}

#[test]
fn serial_digit_sets_speed_and_echoes_character() {
    let speed = speed();
    let setter = SpeedSetter::new(&speed);
    let mut rig = Rig::new();

    let echo = setter.on_command(b'3').unwrap().unwrap();
    assert_eq!(echo, Echo::Received(b'3'));
    assert_eq!(echo.line().as_slice(), b"3\r\n");
    assert_eq!(rig.period(&speed), (48_000, 32_000));
}

#[test]
fn serial_garbage_is_reported_and_ignored() {
    let speed = speed();
    let setter = SpeedSetter::new(&speed);
    let mut rig = Rig::new();

    let err = setter.on_command(b'Z').unwrap_err();
    assert_eq!(err, CommandError::NotADigit(b'Z'));
    assert_eq!(Echo::Rejected(err.byte()).line().as_slice(), b"Z?\r\n");
    assert_eq!(rig.period(&speed), (40_000, 40_000));
}

#[test]
fn simultaneous_presses_echo_once_with_no_net_change() {
    let speed = speed();
    let setter = SpeedSetter::new(&speed);
    let pending = PendingEdges::new();

    pending.raise(EdgeSet::SLOWER);
    pending.raise(EdgeSet::FASTER);

    let edges = pending.take();
    assert_eq!(edges, EdgeSet::BOTH);
    assert_eq!(setter.on_edges(edges), Echo::Status(4));
    assert!(pending.take().is_empty());
}

#[test]
fn concurrent_writers_never_break_period_invariant() {
    let cfg = PwmConfig::TM4C123;
    let speed = speed();
    let pending = PendingEdges::new();
    let valid: Vec<(u32, u32)> = (0..=cfg.max_index)
        .map(|i| {
            let d = cfg.durations(i);
            (d.high_ticks, d.low_ticks)
        })
        .collect();

    thread::scope(|s| {
        // Button sources
        s.spawn(|| {
            for i in 0..2_000 {
                let edge = if i % 3 == 0 { EdgeSet::FASTER } else { EdgeSet::SLOWER };
                pending.raise(edge);
            }
        });

        // Button handler
        s.spawn(|| {
            let setter = SpeedSetter::new(&speed);
            for _ in 0..2_000 {
                let edges = pending.take();
                if !edges.is_empty() {
                    setter.on_edges(edges);
                }
            }
        });

        // Command loop
        s.spawn(|| {
            let setter = SpeedSetter::new(&speed);
            for byte in b"0123456789x\r\n".iter().cycle().take(2_000) {
                let _ = setter.on_command(*byte);
            }
        });

        // Phase timer: each value it sees must be one of the valid durations.
        s.spawn(|| {
            let mut rig = Rig::new();
            for _ in 0..2_000 {
                let ticks = rig.fire(&speed);
                let allowed = match rig.toggler.phase() {
                    Phase::High => valid.iter().any(|&(h, _)| h == ticks),
                    Phase::Low => valid.iter().any(|&(_, l)| l == ticks),
                };
                assert!(allowed, "unexpected tick count {}", ticks);
                assert!(speed.get() <= cfg.max_index);
            }
        });
    });

    assert!(speed.get() <= cfg.max_index);
}
